use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::flow::{FlowCoordinator, Previewer};
use crate::locator::Locator;
use crate::resolver::ContentResolver;

/// Turns preview requests into result messages.
#[derive(Debug, Default)]
pub struct MessagePreviewer {
    pub messages: Vec<CmdMessage>,
}

impl Previewer for MessagePreviewer {
    fn show(&mut self, locator: &Locator, content_type: Option<&str>) {
        self.messages.push(CmdMessage::info(format!(
            "Preview: {} ({})",
            locator,
            content_type.unwrap_or("unknown type")
        )));
    }
}

pub fn run<R, V>(flow: &mut FlowCoordinator<R>, previewer: &mut V) -> Result<CmdResult>
where
    R: ContentResolver,
    V: Previewer + ?Sized,
{
    let local = flow.save(previewer)?;

    let mut result = CmdResult::default().with_locators(vec![local.clone()]);
    result.add_message(CmdMessage::success(format!("Saved as {}", local)));
    Ok(result.with_state(flow.state().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::CmdFixture;
    use crate::error::{FlowError, PicstashError};
    use crate::flow::fixtures::ScriptedPicker;

    #[test]
    fn test_save_after_pick() {
        let mut fx = CmdFixture::new();
        let src = fx.source("a.png", b"abc");
        fx.flow
            .request_pick(&mut ScriptedPicker::picking(src))
            .unwrap();

        let mut previewer = MessagePreviewer::default();
        let res = run(&mut fx.flow, &mut previewer).unwrap();

        assert_eq!(res.locators.len(), 1);
        assert!(res.locators[0].as_str().ends_with(".webp"));
        assert_eq!(previewer.messages.len(), 1);
        assert!(previewer.messages[0].content.contains("image/webp"));
    }

    #[test]
    fn test_save_without_pick() {
        let mut fx = CmdFixture::new();
        let err = run(&mut fx.flow, &mut MessagePreviewer::default()).unwrap_err();
        assert!(matches!(err, PicstashError::Flow(FlowError::NothingStaged)));
    }
}
