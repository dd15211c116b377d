//! # API Facade
//!
//! [`PicstashApi`] is the single entry point for UI clients. It owns the
//! flow coordinator and the session store, dispatches to `commands/*.rs`,
//! and persists the flow state after every step so the next process picks
//! up where this one stopped.
//!
//! Like the commands it wraps, it never prints. Everything the user should
//! see comes back in [`CmdResult::messages`].

use crate::commands::{self, config::ConfigAction, save::MessagePreviewer, CmdResult};
use crate::error::Result;
use crate::flow::{ExternalViewer, FlowCoordinator, Picker};
use crate::resolver::ContentResolver;
use crate::session::SessionStore;

pub use crate::commands::{CmdMessage, MessageLevel, PicstashPaths};

pub struct PicstashApi<R: ContentResolver> {
    flow: FlowCoordinator<R>,
    session: SessionStore,
    paths: PicstashPaths,
}

impl<R: ContentResolver> PicstashApi<R> {
    /// Builds the facade and resumes the last saved flow state.
    pub fn new(
        mut flow: FlowCoordinator<R>,
        session: SessionStore,
        paths: PicstashPaths,
    ) -> Result<Self> {
        flow.restore(session.load_state()?);
        Ok(Self {
            flow,
            session,
            paths,
        })
    }

    pub fn flow(&self) -> &FlowCoordinator<R> {
        &self.flow
    }

    pub fn paths(&self) -> &PicstashPaths {
        &self.paths
    }

    pub fn pick<P: Picker + ?Sized>(&mut self, picker: &mut P) -> Result<CmdResult> {
        let result = commands::pick::run(&mut self.flow, picker);
        self.persist()?;
        result
    }

    pub fn save(&mut self) -> Result<CmdResult> {
        let mut previewer = MessagePreviewer::default();
        let result = commands::save::run(&mut self.flow, &mut previewer);
        self.persist()?;

        let mut result = result?;
        result.messages.extend(previewer.messages);
        Ok(result)
    }

    pub fn view<V: ExternalViewer + ?Sized>(&self, viewer: &mut V) -> Result<CmdResult> {
        commands::view::run(&self.flow, viewer)
    }

    pub fn run<P, V>(&mut self, picker: &mut P, viewer: &mut V) -> Result<CmdResult>
    where
        P: Picker + ?Sized,
        V: ExternalViewer + ?Sized,
    {
        let mut previewer = MessagePreviewer::default();
        let result = commands::run::run(&mut self.flow, picker, &mut previewer, viewer);
        self.persist()?;

        let mut result = result?;
        result.messages.extend(previewer.messages);
        Ok(result)
    }

    pub fn status(&self) -> Result<CmdResult> {
        commands::status::run(&self.flow)
    }

    pub fn list_paths(&self) -> Result<CmdResult> {
        commands::paths::run(&self.paths, &self.flow)
    }

    pub fn clean(&self) -> Result<CmdResult> {
        commands::clean::run(&self.flow)
    }

    /// Reads or updates config. Changes take effect on the next [`PicstashApi::new`].
    ///
    /// Staged locators keep the authority they were issued under, so a
    /// config whose authority differs from theirs is reported as a warning.
    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        let mut result = commands::config::run(&self.paths.data_dir, action)?;

        let issuer = self.flow.authority().authority();
        let configured = result.config.as_ref().map(|c| c.authority.clone());
        if let (Some(configured), Some(staged)) = (configured, self.flow.state().cache_locator()) {
            if configured != issuer {
                result.add_message(CmdMessage::warning(format!(
                    "{} was issued by {}; pick again to stage it under {}.",
                    staged, issuer, configured
                )));
            }
        }
        Ok(result)
    }

    fn persist(&self) -> Result<()> {
        self.session.save(self.flow.state())?;
        Ok(())
    }
}
