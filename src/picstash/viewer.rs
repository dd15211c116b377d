use crate::error::{PicstashError, Result};
use crate::flow::{ExternalViewer, ViewRequest};
use crate::resolver::LocalResolver;
use std::env;
use std::process::Command;

pub const VIEWER_ENV: &str = "PICSTASH_VIEWER";

/// Opens saved files with an external command.
///
/// The command comes from config, or `$PICSTASH_VIEWER` when config has none.
/// It is split on whitespace and the resolved file path is appended as the
/// last argument. Without a command, no request can be handled.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    command: Option<String>,
    resolver: LocalResolver,
}

impl CommandViewer {
    pub fn new(configured: Option<&str>, resolver: LocalResolver) -> Self {
        let command = configured
            .map(str::to_string)
            .or_else(|| env::var(VIEWER_ENV).ok())
            .filter(|c| !c.trim().is_empty());
        Self { command, resolver }
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl ExternalViewer for CommandViewer {
    fn can_handle(&self, request: &ViewRequest) -> bool {
        self.command.is_some() && self.resolver.path_for(&request.locator).is_some()
    }

    fn launch(&mut self, request: &ViewRequest) -> Result<()> {
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| PicstashError::Api(format!("No viewer set. Set ${}.", VIEWER_ENV)))?;
        let path = self.resolver.path_for(&request.locator).ok_or_else(|| {
            PicstashError::Api(format!("Cannot resolve {} for viewing", request.locator))
        })?;

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| PicstashError::Api("Viewer command is empty".to_string()))?;

        let status = Command::new(program)
            .args(parts)
            .arg(&path)
            .status()
            .map_err(|e| PicstashError::Api(format!("Failed to launch viewer '{}': {}", program, e)))?;

        if !status.success() {
            return Err(PicstashError::Api(format!(
                "Viewer '{}' exited with non-zero status",
                program
            )));
        }
        Ok(())
    }
}
