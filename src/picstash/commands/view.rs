use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::flow::{ExternalViewer, FlowCoordinator};
use crate::resolver::ContentResolver;

pub fn run<R, V>(flow: &FlowCoordinator<R>, viewer: &mut V) -> Result<CmdResult>
where
    R: ContentResolver,
    V: ExternalViewer + ?Sized,
{
    let mut result = CmdResult::default();

    match flow.view(viewer)? {
        Some(request) => {
            result.add_message(CmdMessage::success(format!("Opened {}", request.locator)));
            result = result.with_view(request);
        }
        None => {
            let request = flow.view_request()?;
            result.add_message(CmdMessage::warning(format!(
                "No viewer can open {} ({}). Set a viewer with `picstash config viewer <command>`.",
                request.locator,
                request.content_type.as_deref().unwrap_or("unknown type")
            )));
            result = result.with_view(request);
        }
    }

    Ok(result)
}
