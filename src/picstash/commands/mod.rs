use crate::config::PicstashConfig;
use crate::flow::{FlowState, ViewRequest};
use crate::locator::Locator;
use std::path::PathBuf;

pub mod clean;
pub mod config;
pub mod paths;
pub mod pick;
pub mod run;
pub mod save;
pub mod status;
pub mod view;

/// The three app-private directories everything lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicstashPaths {
    /// Scratch space for staged files
    pub cache_dir: PathBuf,
    /// Persistent storage for saved files
    pub files_dir: PathBuf,
    /// Config and session state
    pub data_dir: PathBuf,
}

impl PicstashPaths {
    pub fn under(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            cache_dir: home.join("cache"),
            files_dir: home.join("files"),
            data_dir: home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub locators: Vec<Locator>,
    pub paths: Vec<PathBuf>,
    pub state: Option<FlowState>,
    pub config: Option<PicstashConfig>,
    pub view: Option<ViewRequest>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_locators(mut self, locators: Vec<Locator>) -> Self {
        self.locators = locators;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_state(mut self, state: FlowState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_config(mut self, config: PicstashConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_view(mut self, view: ViewRequest) -> Self {
        self.view = Some(view);
        self
    }

    /// Appends another result's locators and messages.
    pub fn merge(&mut self, other: CmdResult) {
        self.locators.extend(other.locators);
        self.paths.extend(other.paths);
        self.messages.extend(other.messages);
        if other.state.is_some() {
            self.state = other.state;
        }
        if other.view.is_some() {
            self.view = other.view;
        }
    }
}
