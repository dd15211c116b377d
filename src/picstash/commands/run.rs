//! The whole journey in one call: pick, save, then view.

use crate::commands::{pick, save, view, CmdResult};
use crate::error::Result;
use crate::flow::{ExternalViewer, FlowCoordinator, Picker, Previewer};
use crate::resolver::ContentResolver;

pub fn run<R, P, V, X>(
    flow: &mut FlowCoordinator<R>,
    picker: &mut P,
    previewer: &mut V,
    viewer: &mut X,
) -> Result<CmdResult>
where
    R: ContentResolver,
    P: Picker + ?Sized,
    V: Previewer + ?Sized,
    X: ExternalViewer + ?Sized,
{
    let mut result = pick::run(flow, picker)?;
    if result.locators.is_empty() {
        return Ok(result);
    }

    result.merge(save::run(flow, previewer)?);
    result.merge(view::run(flow, viewer)?);
    Ok(result)
}
