//! Create/Update handler for glossaries, collections and projects.
//!
//! A Create stores the element's properties under its resolved or
//! synthesized qualified name and, when a parent is named, links the new
//! element to it. An Update merges (or, with `Merge Update: false`,
//! replaces) the stored properties.

use quill_core::{
    AttributeStyle, Directive, Error, Guid, ParsedCommand, Result, Verb, PARENT_AT_END1_KEY,
    PARENT_RELATIONSHIP_KEY,
};

use super::{properties, replace_all, settle, HandlerContext};
use crate::Output;

/// Handle a Create or Update block of an element family.
pub fn upsert_element(
    hc: &mut HandlerContext<'_>,
    cmd: &ParsedCommand,
    directive: Directive,
) -> Result<Output> {
    if let Some(out) = settle(hc.spec, cmd, directive) {
        return Ok(out);
    }
    let guid = apply_upsert(hc, cmd)?;
    hc.confirm(guid)
}

/// Create or update the anchor entity; returns its GUID.
pub(crate) fn apply_upsert(hc: &mut HandlerContext<'_>, cmd: &ParsedCommand) -> Result<Guid> {
    let props = properties(hc.spec, cmd);
    match cmd.verb {
        Verb::Create => {
            let guid = hc
                .catalog
                .create(&hc.spec.entity_type, &props)
                .map_err(hc.fault("create"))?;
            if let Some(qn) = &cmd.qualified_name {
                let display = cmd.display_name.as_deref().unwrap_or_default();
                hc.ctx.cache.remember(qn, guid.clone(), display, &hc.spec.entity_type);
            }
            tracing::info!(
                target: "quill::executor",
                command = %hc.spec.name,
                qualified_name = cmd.qualified_name.as_deref().unwrap_or(""),
                %guid,
                "Created"
            );
            link_parent(hc, cmd, &guid)?;
            Ok(guid)
        }
        Verb::Update => {
            let guid = cmd.guid.clone().ok_or_else(|| Error::InvalidInput {
                reason: format!("'{}' has no resolved GUID to update", cmd.header_for(cmd.verb)),
            })?;
            let replace = replace_all(cmd);
            hc.catalog
                .update(&hc.spec.entity_type, &guid, &props, replace)
                .map_err(hc.fault("update"))?;
            tracing::info!(
                target: "quill::executor",
                command = %hc.spec.name,
                %guid,
                replace_all = replace,
                "Updated"
            );
            Ok(guid)
        }
        other => Err(Error::InvalidInput {
            reason: format!("'{}' blocks cannot create or update an element", other),
        }),
    }
}

/// Attach a freshly created element to the parent named in its block.
fn link_parent(hc: &mut HandlerContext<'_>, cmd: &ParsedCommand, child: &Guid) -> Result<()> {
    let Some(parent_attr) = hc
        .spec
        .attributes
        .iter()
        .find(|a| matches!(a.style, AttributeStyle::Parent { .. }))
    else {
        return Ok(());
    };
    let Some(parent) = cmd.attribute(&parent_attr.key).and_then(|r| r.guid.clone()) else {
        return Ok(());
    };
    let Some(relationship) = cmd.text(PARENT_RELATIONSHIP_KEY) else {
        return Ok(());
    };
    let parent_at_end1 = cmd.value(PARENT_AT_END1_KEY).as_bool().unwrap_or(true);
    let (end1, end2) = if parent_at_end1 {
        (&parent, child)
    } else {
        (child, &parent)
    };
    hc.catalog
        .link(relationship, end1, end2, &Default::default())
        .map_err(hc.fault("link"))?;
    tracing::debug!(target: "quill::executor", %parent, %child, relationship, "Linked to parent");
    Ok(())
}
