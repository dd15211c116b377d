//! # Picstash Architecture
//!
//! Picstash picks a file, stages a private copy of it in the app cache,
//! saves that copy into persistent app storage, and hands the saved copy to
//! a previewer or an external viewer. It is a library first; the CLI in
//! `main.rs` is one client of it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints messages and locators           │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Facade over commands, persists the flow state            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One file per user-facing operation, returns CmdResult    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Flow Layer (flow.rs, session.rs)                           │
//! │  - FlowCoordinator state machine: Idle → Ready → Previewable│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  I/O Layer                                                  │
//! │  - provision.rs: empty destination files                    │
//! │  - copy.rs: chunked stream copy with completion callback    │
//! │  - authority.rs / resolver.rs: locators ↔ byte streams      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locators
//!
//! Everything above the I/O layer talks in [`locator::Locator`]s, never in
//! paths. `file://` locators name a path directly; `content://` locators are
//! issued by a [`authority::FileAuthority`] for files under one of its named
//! roots (`cache`, `files`) and are resolved back to paths only inside the
//! resolver.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code returns `Result<CmdResult>` and never writes to
//! stdout. Diagnostics go through `tracing`; the CLI decides where they land.
//! Picking, previewing and external viewing are traits in `flow.rs` so the
//! same core runs against scripted fixtures in tests.

pub mod api;
pub mod authority;
pub mod commands;
pub mod config;
pub mod copy;
pub mod error;
pub mod flow;
pub mod init;
pub mod locator;
pub mod logging;
pub mod picker;
pub mod provision;
pub mod resolver;
pub mod session;
pub mod viewer;
