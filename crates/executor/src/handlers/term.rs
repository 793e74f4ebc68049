//! Create/Update handler for glossary terms.
//!
//! Terms are elements with one extra step: a new term is anchored in the
//! glossary named by its `In Glossary` section.

use quill_core::{Directive, ParsedCommand, Properties, Result, Verb};

use super::element::apply_upsert;
use super::{settle, HandlerContext};
use crate::Output;

/// Relationship between a glossary (end 1) and its terms (end 2).
pub const TERM_ANCHOR_RELATIONSHIP: &str = "TermAnchor";

/// Key of the glossary reference on term commands.
pub const GLOSSARY_KEY: &str = "glossary";

/// Handle a Create or Update Glossary Term block.
pub fn upsert_term(
    hc: &mut HandlerContext<'_>,
    cmd: &ParsedCommand,
    directive: Directive,
) -> Result<Output> {
    if let Some(out) = settle(hc.spec, cmd, directive) {
        return Ok(out);
    }
    let guid = apply_upsert(hc, cmd)?;

    if cmd.verb == Verb::Create {
        if let Some(glossary) = cmd.attribute(GLOSSARY_KEY).and_then(|r| r.guid.as_ref()) {
            hc.catalog
                .link(TERM_ANCHOR_RELATIONSHIP, glossary, &guid, &Properties::new())
                .map_err(hc.fault("link"))?;
            tracing::debug!(target: "quill::executor", %glossary, term = %guid, "Term anchored");
        }
    }
    hc.confirm(guid)
}
