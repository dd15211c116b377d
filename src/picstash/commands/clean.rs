use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::flow::FlowCoordinator;
use crate::resolver::ContentResolver;
use std::fs;
use tracing::debug;

/// Removes staged cache files that the current state no longer refers to.
///
/// Saved files are never touched.
pub fn run<R: ContentResolver>(flow: &FlowCoordinator<R>) -> Result<CmdResult> {
    let cache_dir = &flow.layout().cache_dir;
    let keep = flow.state().cache_locator().and_then(|l| l.file_name());

    let mut removed = Vec::new();
    if cache_dir.is_dir() {
        for entry in fs::read_dir(cache_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if keep.is_some_and(|k| name.to_str() == Some(k)) {
                continue;
            }
            fs::remove_file(entry.path())?;
            debug!(path = %entry.path().display(), "removed stale cache file");
            removed.push(entry.path());
        }
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(match removed.len() {
        0 => "No stale cache files.".to_string(),
        1 => "Removed 1 stale cache file.".to_string(),
        n => format!("Removed {} stale cache files.", n),
    }));
    Ok(result.with_paths(removed))
}
