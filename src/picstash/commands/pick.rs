use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::flow::{FlowCoordinator, Picker};
use crate::resolver::ContentResolver;

pub fn run<R, P>(flow: &mut FlowCoordinator<R>, picker: &mut P) -> Result<CmdResult>
where
    R: ContentResolver,
    P: Picker + ?Sized,
{
    let mut result = CmdResult::default();

    match flow.request_pick(picker)? {
        Some(cache) => {
            result.add_message(CmdMessage::success(format!("Staged as {}", cache)));
            result = result.with_locators(vec![cache]);
        }
        None => result.add_message(CmdMessage::info("Pick cancelled, nothing staged.")),
    }

    Ok(result.with_state(flow.state().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::CmdFixture;
    use crate::commands::MessageLevel;
    use crate::flow::fixtures::ScriptedPicker;
    use crate::flow::FlowState;

    #[test]
    fn test_pick_stages_file() {
        let mut fx = CmdFixture::new();
        let src = fx.source("a.png", b"abc");

        let res = run(&mut fx.flow, &mut ScriptedPicker::picking(src)).unwrap();

        assert_eq!(res.locators.len(), 1);
        assert_eq!(res.messages[0].level, MessageLevel::Success);
        assert!(matches!(res.state, Some(FlowState::Ready { .. })));
    }

    #[test]
    fn test_cancelled_pick_reports_info() {
        let mut fx = CmdFixture::new();

        let res = run(&mut fx.flow, &mut ScriptedPicker::cancelling()).unwrap();

        assert!(res.locators.is_empty());
        assert_eq!(res.messages[0].level, MessageLevel::Info);
        assert_eq!(res.state, Some(FlowState::Idle));
    }
}
