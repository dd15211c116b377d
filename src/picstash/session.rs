//! Persisting the flow state between CLI invocations.
//!
//! Each CLI command is a separate process, so the coordinator's state is
//! written to `<data dir>/state.json` after every command and read back at
//! the start of the next one.

use crate::error::Result;
use crate::flow::FlowState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STATE_FILENAME: &str = "state.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub state: FlowState,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }

    pub fn load(&self) -> Result<Option<SessionRecord>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// The saved state, or `Idle` if nothing was saved yet.
    pub fn load_state(&self) -> Result<FlowState> {
        Ok(self.load()?.map(|r| r.state).unwrap_or_default())
    }

    pub fn save(&self, state: &FlowState) -> Result<SessionRecord> {
        ensure_dir(&self.dir)?;

        let record = SessionRecord {
            state: state.clone(),
            updated_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&record)?;

        let tmp_file = self.dir.join(format!(".state-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, self.path())?;
        Ok(record)
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
