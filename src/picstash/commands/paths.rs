use crate::commands::{CmdResult, PicstashPaths};
use crate::error::Result;
use crate::flow::FlowCoordinator;
use crate::resolver::ContentResolver;

/// Cache dir, saved-files dir and data dir, in that order.
pub fn run<R: ContentResolver>(
    paths: &PicstashPaths,
    flow: &FlowCoordinator<R>,
) -> Result<CmdResult> {
    Ok(CmdResult::default().with_paths(vec![
        paths.cache_dir.clone(),
        flow.layout().local_dir.clone(),
        paths.data_dir.clone(),
    ]))
}
