//! # Flow Coordination
//!
//! The coordinator sequences a single user journey:
//!
//! ```text
//! Idle ──begin_pick──▶ Picking ──Picked(src)──▶ CopyingToCache ──done──▶ Ready
//!   ▲                    │                                                │
//!   └────Cancelled───────┘                                              save
//!                                                                         ▼
//!                    Previewable ◀──────────done────────────── CopyingToLocal
//! ```
//!
//! State is an explicit [`FlowState`] value rather than a nullable "current
//! cache" field, so a save without a staged file is a typed error
//! ([`FlowError::NothingStaged`]) instead of a crash further down.
//!
//! Picking, previewing and viewing are external concerns. The coordinator
//! only talks to them through the [`Picker`], [`Previewer`] and
//! [`ExternalViewer`] traits.
//!
//! Each copy runs on a worker from [`spawn_copy`] and the coordinator waits
//! for its single outcome, so calls still block the caller. A failed copy
//! removes the file provisioned for it and puts the coordinator back in the
//! state it was in before. [`FlowCoordinator::cancel_token`] lets another
//! thread stop the copy in flight.

use crate::authority::FileAuthority;
use crate::copy::{spawn_copy, CancelToken, Copier, CopyOutcome};
use crate::error::{CopyError, FlowError, Result};
use crate::locator::Locator;
use crate::provision::{provide_file, unique_prefix};
use crate::resolver::{ContentResolver, LocalResolver};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickCategory {
    /// Only items that can be opened as a byte stream
    Openable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub category: PickCategory,
    pub mime_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Picked(Option<Locator>),
    Cancelled,
}

pub trait Picker {
    fn pick(&mut self, request: &PickRequest) -> PickResult;
}

pub trait Previewer {
    fn show(&mut self, locator: &Locator, content_type: Option<&str>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadGrant {
    /// The receiving process may read the locator for the lifetime of the request
    Temporary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub locator: Locator,
    pub content_type: Option<String>,
    pub grant: ReadGrant,
}

pub trait ExternalViewer {
    fn can_handle(&self, request: &ViewRequest) -> bool;
    fn launch(&mut self, request: &ViewRequest) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    Picking {
        prior: Option<Locator>,
    },
    CopyingToCache {
        source: Locator,
        prior: Option<Locator>,
    },
    Ready {
        cache: Locator,
    },
    CopyingToLocal {
        cache: Locator,
        local: Locator,
    },
    Previewable {
        cache: Locator,
        local: Locator,
    },
}

impl FlowState {
    fn settled(prior: Option<Locator>) -> Self {
        match prior {
            Some(cache) => FlowState::Ready { cache },
            None => FlowState::Idle,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Picking { .. } => "picking",
            FlowState::CopyingToCache { .. } => "copying-to-cache",
            FlowState::Ready { .. } => "ready",
            FlowState::CopyingToLocal { .. } => "copying-to-local",
            FlowState::Previewable { .. } => "previewable",
        }
    }

    /// The staged cache locator, if one is held.
    pub fn cache_locator(&self) -> Option<&Locator> {
        match self {
            FlowState::Idle => None,
            FlowState::Picking { prior } | FlowState::CopyingToCache { prior, .. } => prior.as_ref(),
            FlowState::Ready { cache }
            | FlowState::CopyingToLocal { cache, .. }
            | FlowState::Previewable { cache, .. } => Some(cache),
        }
    }

    pub fn local_locator(&self) -> Option<&Locator> {
        match self {
            FlowState::Previewable { local, .. } => Some(local),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            FlowState::Picking { .. }
                | FlowState::CopyingToCache { .. }
                | FlowState::CopyingToLocal { .. }
        )
    }

    /// Drops any in-flight step, falling back to the last settled state.
    pub fn stabilized(self) -> Self {
        match self {
            FlowState::Picking { prior } | FlowState::CopyingToCache { prior, .. } => {
                Self::settled(prior)
            }
            FlowState::CopyingToLocal { cache, .. } => FlowState::Ready { cache },
            settled => settled,
        }
    }
}

/// Where provisioned files go and what the picker is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub cache_dir: PathBuf,
    pub local_dir: PathBuf,
    pub local_suffix: String,
    pub pick_filter: String,
}

pub struct FlowCoordinator<R: ContentResolver> {
    resolver: Arc<R>,
    authority: FileAuthority,
    layout: StorageLayout,
    copier: Copier,
    cancel: CancelToken,
    state: FlowState,
}

impl FlowCoordinator<LocalResolver> {
    pub fn local(authority: FileAuthority, layout: StorageLayout, copier: Copier) -> Self {
        Self::new(LocalResolver::new(authority.clone()), authority, layout, copier)
    }
}

impl<R: ContentResolver> FlowCoordinator<R> {
    pub fn new(resolver: R, authority: FileAuthority, layout: StorageLayout, copier: Copier) -> Self {
        Self {
            resolver: Arc::new(resolver),
            authority,
            layout,
            copier,
            cancel: CancelToken::new(),
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn authority(&self) -> &FileAuthority {
        &self.authority
    }

    /// Stops the copy in flight at its next chunk boundary.
    ///
    /// Every copy starts uncancelled, so a cancel only reaches the copy
    /// running when it is issued.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Resumes from a saved state. In-flight steps are dropped.
    pub fn restore(&mut self, state: FlowState) {
        self.state = state.stabilized();
    }

    pub fn begin_pick(&mut self) -> Result<PickRequest> {
        if self.state.is_busy() {
            return Err(FlowError::Busy.into());
        }
        let prior = self.state.cache_locator().cloned();
        self.state = FlowState::Picking { prior };
        debug!(filter = %self.layout.pick_filter, "launching picker");

        Ok(PickRequest {
            category: PickCategory::Openable,
            mime_filter: self.layout.pick_filter.clone(),
        })
    }

    pub fn request_pick<P: Picker + ?Sized>(&mut self, picker: &mut P) -> Result<Option<Locator>> {
        let request = self.begin_pick()?;
        let result = picker.pick(&request);
        self.handle_pick_result(result)
    }

    /// Stages the picked source into a fresh cache file.
    ///
    /// Returns the new cache locator, or `None` if the pick was cancelled or
    /// carried no data.
    pub fn handle_pick_result(&mut self, result: PickResult) -> Result<Option<Locator>> {
        let FlowState::Picking { prior } = &self.state else {
            return Err(FlowError::UnexpectedPickResult.into());
        };
        let prior = prior.clone();

        let source = match result {
            PickResult::Picked(Some(source)) => source,
            PickResult::Picked(None) | PickResult::Cancelled => {
                debug!("pick cancelled or empty");
                self.state = FlowState::settled(prior);
                return Ok(None);
            }
        };
        debug!(%source, "got pick result");

        let cache = match self.provision(&self.layout.cache_dir, "") {
            Ok(cache) => cache,
            Err(e) => {
                self.state = FlowState::settled(prior);
                return Err(e);
            }
        };

        self.state = FlowState::CopyingToCache {
            source: source.clone(),
            prior: prior.clone(),
        };

        match self.run_copy(&source, &cache) {
            Ok(cache) => {
                self.state = FlowState::Ready {
                    cache: cache.clone(),
                };
                Ok(Some(cache))
            }
            Err(e) => {
                self.discard(&cache);
                self.state = FlowState::settled(prior);
                Err(e.into())
            }
        }
    }

    /// Copies the staged cache file into persistent storage and previews it.
    pub fn save<V: Previewer + ?Sized>(&mut self, previewer: &mut V) -> Result<Locator> {
        if self.state.is_busy() {
            return Err(FlowError::Busy.into());
        }
        let cache = self
            .state
            .cache_locator()
            .cloned()
            .ok_or(FlowError::NothingStaged)?;

        let local = self.provision(&self.layout.local_dir, &self.layout.local_suffix)?;

        let previous = std::mem::replace(
            &mut self.state,
            FlowState::CopyingToLocal {
                cache: cache.clone(),
                local: local.clone(),
            },
        );

        if let Err(e) = self.run_copy(&cache, &local) {
            self.discard(&local);
            self.state = previous;
            return Err(e.into());
        }
        self.state = FlowState::Previewable {
            cache,
            local: local.clone(),
        };

        debug!(%local, "saved, handing to previewer");
        let content_type = self.resolver.content_type(&local);
        previewer.show(&local, content_type.as_deref());
        Ok(local)
    }

    pub fn view_request(&self) -> Result<ViewRequest> {
        let local = self
            .state
            .local_locator()
            .ok_or(FlowError::NothingSaved)?;
        Ok(ViewRequest {
            locator: local.clone(),
            content_type: self.resolver.content_type(local),
            grant: ReadGrant::Temporary,
        })
    }

    /// Asks an external viewer to open the saved file.
    ///
    /// Returns `None` when the viewer cannot service the request.
    pub fn view<V: ExternalViewer + ?Sized>(&self, viewer: &mut V) -> Result<Option<ViewRequest>> {
        let request = self.view_request()?;
        if !viewer.can_handle(&request) {
            debug!(locator = %request.locator, "no viewer can handle request");
            return Ok(None);
        }
        viewer.launch(&request)?;
        Ok(Some(request))
    }

    fn provision(&self, dir: &Path, suffix: &str) -> Result<Locator> {
        let path = provide_file(dir, &unique_prefix(), suffix)?;
        Ok(self.authority.locator_for_file(&path)?)
    }

    fn run_copy(&self, source: &Locator, destination: &Locator) -> CopyOutcome {
        self.cancel.reset();
        let handle = spawn_copy(
            self.copier,
            Arc::clone(&self.resolver),
            source.clone(),
            destination.clone(),
            self.cancel.clone(),
        )
        .map_err(CopyError::Spawn)?;
        handle.wait()
    }

    /// Removes a file provisioned for a copy that did not complete.
    fn discard(&self, locator: &Locator) {
        let Ok(path) = self.authority.path_for(locator) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed unused file"),
            Err(e) => warn!(path = %path.display(), "could not remove unused file: {}", e),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// A picker that answers every request with the same result.
    #[derive(Debug)]
    pub struct ScriptedPicker {
        pub result: PickResult,
        pub requests: Vec<PickRequest>,
    }

    impl ScriptedPicker {
        pub fn picking(locator: Locator) -> Self {
            Self {
                result: PickResult::Picked(Some(locator)),
                requests: Vec::new(),
            }
        }

        pub fn cancelling() -> Self {
            Self {
                result: PickResult::Cancelled,
                requests: Vec::new(),
            }
        }
    }

    impl Picker for ScriptedPicker {
        fn pick(&mut self, request: &PickRequest) -> PickResult {
            self.requests.push(request.clone());
            self.result.clone()
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingPreviewer {
        pub shown: Vec<(Locator, Option<String>)>,
    }

    impl Previewer for RecordingPreviewer {
        fn show(&mut self, locator: &Locator, content_type: Option<&str>) {
            self.shown
                .push((locator.clone(), content_type.map(str::to_string)));
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingViewer {
        pub available: bool,
        pub launched: Vec<ViewRequest>,
    }

    impl RecordingViewer {
        pub fn available() -> Self {
            Self {
                available: true,
                launched: Vec::new(),
            }
        }
    }

    impl ExternalViewer for RecordingViewer {
        fn can_handle(&self, _request: &ViewRequest) -> bool {
            self.available
        }

        fn launch(&mut self, request: &ViewRequest) -> Result<()> {
            self.launched.push(request.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::authority::{CACHE_ROOT, FILES_ROOT};
    use crate::error::PicstashError;
    use std::io::{self, Read, Write};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        flow: FlowCoordinator<LocalResolver>,
    }

    fn authority_and_layout(temp: &TempDir) -> (FileAuthority, StorageLayout) {
        let cache_dir = temp.path().join("cache");
        let files_dir = temp.path().join("files");
        let authority = FileAuthority::new("test.authority")
            .with_root(CACHE_ROOT, &cache_dir)
            .with_root(FILES_ROOT, &files_dir);
        let layout = StorageLayout {
            cache_dir,
            local_dir: files_dir.join("pictures"),
            local_suffix: ".webp".to_string(),
            pick_filter: "image/*".to_string(),
        };
        (authority, layout)
    }

    fn files_in(dir: &Path) -> usize {
        match fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let (authority, layout) = authority_and_layout(&temp);
            let flow = FlowCoordinator::local(authority, layout, Copier::default());
            Self { temp, flow }
        }

        fn source(&self, name: &str, content: &[u8]) -> Locator {
            let path = self.temp.path().join(name);
            fs::write(&path, content).unwrap();
            Locator::from_file_path(&path).unwrap()
        }

        fn read(&self, locator: &Locator) -> Vec<u8> {
            let path = self.flow.resolver().path_for(locator).unwrap();
            fs::read(path).unwrap()
        }
    }

    #[test]
    fn test_pick_save_preview_scenario() {
        let mut fx = Fixture::new();
        let content: Vec<u8> = (0..5_000).map(|i| (i % 256) as u8).collect();
        let l1 = fx.source("photo.png", &content);

        let mut picker = ScriptedPicker::picking(l1);
        let c1 = fx.flow.request_pick(&mut picker).unwrap().unwrap();

        assert_eq!(picker.requests.len(), 1);
        assert_eq!(picker.requests[0].mime_filter, "image/*");
        assert_eq!(picker.requests[0].category, PickCategory::Openable);
        assert_eq!(fx.flow.state(), &FlowState::Ready { cache: c1.clone() });
        assert_eq!(fx.read(&c1), content);

        let mut previewer = RecordingPreviewer::default();
        let p1 = fx.flow.save(&mut previewer).unwrap();

        let p1_path = fx.flow.resolver().path_for(&p1).unwrap();
        assert!(p1_path.starts_with(fx.temp.path().join("files").join("pictures")));
        assert_eq!(p1_path.extension().unwrap(), "webp");
        assert_eq!(fx.read(&p1), content);
        assert_eq!(
            previewer.shown,
            vec![(p1.clone(), Some("image/webp".to_string()))]
        );
        assert_eq!(
            fx.flow.state(),
            &FlowState::Previewable {
                cache: c1,
                local: p1
            }
        );
    }

    #[test]
    fn test_cancelled_pick_changes_nothing() {
        let mut fx = Fixture::new();
        let mut picker = ScriptedPicker::cancelling();

        let result = fx.flow.request_pick(&mut picker).unwrap();

        assert_eq!(result, None);
        assert_eq!(fx.flow.state(), &FlowState::Idle);
        assert!(!fx.temp.path().join("cache").exists());
    }

    #[test]
    fn test_empty_pick_keeps_previous_cache() {
        let mut fx = Fixture::new();
        let src = fx.source("a.png", b"first");
        let c1 = fx
            .flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap()
            .unwrap();

        fx.flow.begin_pick().unwrap();
        let result = fx.flow.handle_pick_result(PickResult::Picked(None)).unwrap();

        assert_eq!(result, None);
        assert_eq!(fx.flow.state(), &FlowState::Ready { cache: c1 });
    }

    #[test]
    fn test_save_before_pick_fails_fast() {
        let mut fx = Fixture::new();
        let mut previewer = RecordingPreviewer::default();

        let err = fx.flow.save(&mut previewer).unwrap_err();

        assert!(matches!(err, PicstashError::Flow(FlowError::NothingStaged)));
        assert!(previewer.shown.is_empty());
        assert!(!fx.temp.path().join("files").exists());
    }

    #[test]
    fn test_failed_cache_copy_restores_state() {
        let mut fx = Fixture::new();
        let missing = Locator::from_file_path(&fx.temp.path().join("missing.png")).unwrap();

        let err = fx
            .flow
            .request_pick(&mut ScriptedPicker::picking(missing))
            .unwrap_err();

        assert!(matches!(
            err,
            PicstashError::Copy(CopyError::OpenSource { .. })
        ));
        assert_eq!(fx.flow.state(), &FlowState::Idle);
        assert_eq!(files_in(&fx.temp.path().join("cache")), 0);
    }

    #[test]
    fn test_failed_save_removes_local_file() {
        let mut fx = Fixture::new();
        let src = fx.source("a.png", b"pixels");
        let cache = fx
            .flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap()
            .unwrap();
        fs::remove_file(fx.flow.resolver().path_for(&cache).unwrap()).unwrap();

        let mut previewer = RecordingPreviewer::default();
        let err = fx.flow.save(&mut previewer).unwrap_err();

        assert!(matches!(
            err,
            PicstashError::Copy(CopyError::OpenSource { .. })
        ));
        assert_eq!(fx.flow.state(), &FlowState::Ready { cache });
        assert!(previewer.shown.is_empty());
        assert_eq!(files_in(&fx.temp.path().join("files").join("pictures")), 0);
    }

    /// Cancels the shared token as soon as the first chunk has been read.
    struct CancelAfterFirstRead {
        inner: LocalResolver,
        token: Arc<Mutex<Option<CancelToken>>>,
    }

    struct CancellingReader {
        inner: Box<dyn Read + Send>,
        token: Option<CancelToken>,
    }

    impl Read for CancellingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = self.inner.read(buf)?;
            if let Some(token) = &self.token {
                token.cancel();
            }
            Ok(len)
        }
    }

    impl ContentResolver for CancelAfterFirstRead {
        fn open_read(&self, locator: &Locator) -> std::result::Result<Box<dyn Read + Send>, CopyError> {
            Ok(Box::new(CancellingReader {
                inner: self.inner.open_read(locator)?,
                token: self.token.lock().unwrap().clone(),
            }))
        }

        fn open_write(&self, locator: &Locator) -> std::result::Result<Box<dyn Write + Send>, CopyError> {
            self.inner.open_write(locator)
        }

        fn content_type(&self, locator: &Locator) -> Option<String> {
            self.inner.content_type(locator)
        }
    }

    #[test]
    fn test_cancel_token_stops_copy_in_flight() {
        let temp = TempDir::new().unwrap();
        let (authority, layout) = authority_and_layout(&temp);
        let slot = Arc::new(Mutex::new(None));
        let resolver = CancelAfterFirstRead {
            inner: LocalResolver::new(authority.clone()),
            token: Arc::clone(&slot),
        };
        let mut flow = FlowCoordinator::new(resolver, authority, layout, Copier::default());
        *slot.lock().unwrap() = Some(flow.cancel_token());

        let path = temp.path().join("big.png");
        fs::write(&path, vec![7u8; 5_000]).unwrap();
        let src = Locator::from_file_path(&path).unwrap();

        let err = flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap_err();

        assert!(matches!(
            err,
            PicstashError::Copy(CopyError::Cancelled { copied: 2048 })
        ));
        assert_eq!(flow.state(), &FlowState::Idle);
        assert_eq!(files_in(&temp.path().join("cache")), 0);
    }

    #[test]
    fn test_pick_result_without_pending_pick() {
        let mut fx = Fixture::new();
        let err = fx
            .flow
            .handle_pick_result(PickResult::Cancelled)
            .unwrap_err();
        assert!(matches!(
            err,
            PicstashError::Flow(FlowError::UnexpectedPickResult)
        ));
    }

    #[test]
    fn test_begin_pick_twice_is_busy() {
        let mut fx = Fixture::new();
        fx.flow.begin_pick().unwrap();
        let err = fx.flow.begin_pick().unwrap_err();
        assert!(matches!(err, PicstashError::Flow(FlowError::Busy)));
    }

    #[test]
    fn test_view_requires_saved_file() {
        let fx = Fixture::new();
        let mut viewer = RecordingViewer::available();
        let err = fx.flow.view(&mut viewer).unwrap_err();
        assert!(matches!(err, PicstashError::Flow(FlowError::NothingSaved)));
    }

    #[test]
    fn test_view_issues_request_only_with_handler() {
        let mut fx = Fixture::new();
        let src = fx.source("a.png", b"pixels");
        fx.flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap();
        let local = fx.flow.save(&mut RecordingPreviewer::default()).unwrap();

        let mut unavailable = RecordingViewer::default();
        assert_eq!(fx.flow.view(&mut unavailable).unwrap(), None);
        assert!(unavailable.launched.is_empty());

        let mut viewer = RecordingViewer::available();
        let request = fx.flow.view(&mut viewer).unwrap().unwrap();
        assert_eq!(request.locator, local);
        assert_eq!(request.content_type.as_deref(), Some("image/webp"));
        assert_eq!(request.grant, ReadGrant::Temporary);
        assert_eq!(viewer.launched, vec![request]);
    }

    #[test]
    fn test_second_save_makes_a_new_file() {
        let mut fx = Fixture::new();
        let src = fx.source("a.png", b"pixels");
        fx.flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap();

        let mut previewer = RecordingPreviewer::default();
        let first = fx.flow.save(&mut previewer).unwrap();
        let second = fx.flow.save(&mut previewer).unwrap();

        assert_ne!(first, second);
        assert_eq!(fx.read(&first), fx.read(&second));
        assert_eq!(previewer.shown.len(), 2);
    }

    #[test]
    fn test_restore_drops_in_flight_steps() {
        let cache = Locator::parse("content://a/cache/1").unwrap();
        let local = Locator::parse("content://a/files/pictures/2.webp").unwrap();

        assert_eq!(
            FlowState::CopyingToLocal {
                cache: cache.clone(),
                local
            }
            .stabilized(),
            FlowState::Ready {
                cache: cache.clone()
            }
        );
        assert_eq!(
            FlowState::Picking { prior: None }.stabilized(),
            FlowState::Idle
        );
        assert_eq!(
            FlowState::CopyingToCache {
                source: cache.clone(),
                prior: Some(cache.clone())
            }
            .stabilized(),
            FlowState::Ready { cache }
        );
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let state = FlowState::Ready {
            cache: Locator::parse("content://a/cache/1").unwrap(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"state":"ready","cache":"content://a/cache/1"}"#);
    }
}
