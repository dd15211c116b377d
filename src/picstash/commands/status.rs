use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::flow::{FlowCoordinator, FlowState};
use crate::resolver::ContentResolver;

pub fn run<R: ContentResolver>(flow: &FlowCoordinator<R>) -> Result<CmdResult> {
    let state = flow.state();
    let mut result = CmdResult::default();

    let locators: Vec<_> = state
        .cache_locator()
        .into_iter()
        .chain(state.local_locator())
        .cloned()
        .collect();

    let summary = match state {
        FlowState::Idle => "Nothing staged.".to_string(),
        FlowState::Ready { .. } => "Staged, not saved yet.".to_string(),
        FlowState::Previewable { .. } => "Staged and saved.".to_string(),
        other => format!("In progress: {}", other.name()),
    };
    result.add_message(CmdMessage::info(summary));

    Ok(result.with_locators(locators).with_state(state.clone()))
}
