//! Link/Detach handler for relationship commands.
//!
//! The first two Reference Name attributes of the specification are the
//! relationship's ends, in order. Remaining attributes with a value become
//! relationship properties on Link. A Link that already holds only renders
//! its first end; a Detach with nothing to remove is skipped.

use quill_core::{
    AttributeStyle, CommandSpecification, Directive, Error, Guid, ParsedCommand, Properties,
    Result, Verb,
};

use super::{settle, HandlerContext};
use crate::Output;

/// GUIDs of the two ends, in specification order.
fn ends(spec: &CommandSpecification, cmd: &ParsedCommand) -> Result<(Guid, Guid)> {
    let mut guids = spec
        .attributes
        .iter()
        .filter(|a| matches!(a.style, AttributeStyle::ReferenceName { .. }))
        .map(|a| cmd.attribute(&a.key).and_then(|r| r.guid.clone()));

    match (guids.next().flatten(), guids.next().flatten()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(Error::InvalidInput {
            reason: format!("'{}' does not name two resolved ends", spec.name),
        }),
    }
}

fn relationship_properties(spec: &CommandSpecification, cmd: &ParsedCommand) -> Properties {
    let mut props = Properties::new();
    for attr in spec.attributes.iter().filter(|a| !a.style.is_reference()) {
        let value = cmd.value(&attr.key);
        if !value.is_missing() {
            props.insert(attr.property(), value.to_json());
        }
    }
    props
}

/// Handle a Link or Detach block.
pub fn link_relationship(
    hc: &mut HandlerContext<'_>,
    cmd: &ParsedCommand,
    directive: Directive,
) -> Result<Output> {
    if let Some(out) = settle(hc.spec, cmd, directive) {
        return Ok(out);
    }
    let relationship = hc.spec.relationship_type.as_deref().ok_or_else(|| Error::CommandTable {
        reason: format!("'{}' has no relationship type", hc.spec.name),
    })?;
    let (end1, end2) = ends(hc.spec, cmd)?;
    let present = hc
        .catalog
        .related(relationship, &end1, &end2)
        .map_err(hc.fault("related"))?;
    match cmd.verb {
        Verb::Link if present => {
            tracing::debug!(target: "quill::executor", relationship, %end1, %end2, "Already linked");
            return hc.confirm(end1);
        }
        Verb::Link => {
            let props = relationship_properties(hc.spec, cmd);
            hc.catalog
                .link(relationship, &end1, &end2, &props)
                .map_err(hc.fault("link"))?;
        }
        Verb::Detach if !present => {
            let reason = format!("No {} relationship between {} and {}", relationship, end1, end2);
            tracing::warn!(target: "quill::executor", command = %hc.spec.name, reason = %reason, "Block skipped");
            return Ok(Output::Skipped { reason });
        }
        Verb::Detach => {
            hc.catalog
                .detach(relationship, &end1, &end2)
                .map_err(hc.fault("detach"))?;
        }
        other => {
            return Err(Error::InvalidInput {
                reason: format!("'{}' blocks cannot change relationships", other),
            })
        }
    }
    tracing::info!(
        target: "quill::executor",
        command = %hc.spec.name,
        relationship,
        %end1,
        %end2,
        verb = %cmd.verb,
        "Relationship changed"
    );
    hc.confirm(end1)
}
