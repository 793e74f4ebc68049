//! Delete handler.

use quill_core::{Directive, Error, ParsedCommand, Result};

use super::{settle, HandlerContext};
use crate::Output;

/// Handle a Delete block. A missing target is skipped, never converted.
pub fn delete_element(
    hc: &mut HandlerContext<'_>,
    cmd: &ParsedCommand,
    directive: Directive,
) -> Result<Output> {
    if let Some(out) = settle(hc.spec, cmd, directive) {
        return Ok(out);
    }
    let guid = cmd.guid.clone().ok_or_else(|| Error::InvalidInput {
        reason: format!("'{}' has no resolved GUID to delete", cmd.header_for(cmd.verb)),
    })?;
    hc.catalog
        .delete(&hc.spec.entity_type, &guid)
        .map_err(hc.fault("delete"))?;

    let qn = cmd.qualified_name.clone().unwrap_or_default();
    hc.ctx.cache.forget(&qn);
    tracing::info!(target: "quill::executor", command = %hc.spec.name, qualified_name = %qn, %guid, "Deleted");

    let text = format!("* Deleted {} `{}` ({})\n", cmd.object_type, qn, guid);
    Ok(Output::Applied { guid, text })
}
