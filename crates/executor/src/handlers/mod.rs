//! Command handlers organized by command family.
//!
//! | Module | Verbs | Families |
//! |--------|-------|----------|
//! | `element` | Create, Update | Glossary, Collection, Project |
//! | `term` | Create, Update | Glossary Term |
//! | `link` | Link, Detach | every relationship command |
//! | `delete` | Delete | every element family |
//! | `view` | View, List | every element family |
//!
//! Every handler starts with [`settle`], which implements the directive
//! state machine shared by all families. A handler only reaches the catalog
//! for writes when `settle` returns `None`, i.e. under `Directive::Process`
//! with a valid command.

pub mod delete;
pub mod element;
pub mod link;
pub mod term;
pub mod view;

use quill_core::{
    AttributeStyle, CatalogClient, CommandSpecification, Directive, Error, Guid, OutputFormat,
    ParsedCommand, Properties, Result, Verb, PARENT_AT_END1_KEY, PARENT_RELATIONSHIP_KEY,
};
use quill_engine::rewrite::{remove_section, replace_header, set_section};
use quill_engine::ProcessingContext;

use crate::Output;

/// Key of the attribute choosing between merge and replace on update.
pub const MERGE_UPDATE_KEY: &str = "merge_update";

/// Everything a handler may touch while handling one block.
pub struct HandlerContext<'a> {
    /// Catalog the block is applied to
    pub catalog: &'a dyn CatalogClient,
    /// The pass's processing state
    pub ctx: &'a mut ProcessingContext,
    /// Specification the block was parsed with
    pub spec: &'a CommandSpecification,
}

impl HandlerContext<'_> {
    /// Wrap a catalog failure with this command and `operation`.
    pub(crate) fn fault(&self, operation: &str) -> impl FnOnce(quill_core::CatalogError) -> Error {
        let command = self.spec.name.clone();
        let operation = operation.to_string();
        move |e| Error::catalog(command, operation, e)
    }

    /// Render the entity a mutation touched.
    pub(crate) fn confirm(&self, guid: Guid) -> Result<Output> {
        let text = self
            .catalog
            .render(&guid, OutputFormat::Md)
            .map_err(self.fault("render"))?;
        Ok(Output::Applied { guid, text })
    }
}

/// The directive state machine.
///
/// Returns the output for every combination except `Process` with a valid
/// command, which is left to the handler.
pub fn settle(spec: &CommandSpecification, cmd: &ParsedCommand, directive: Directive) -> Option<Output> {
    match directive {
        Directive::Display => Some(Output::Echo(cmd.display_text.clone())),
        Directive::Validate => Some(Output::Validated {
            valid: cmd.valid,
            reasons: cmd.reasons.clone(),
        }),
        Directive::Process if cmd.valid => None,
        Directive::Process => Some(settle_invalid(spec, cmd)),
    }
}

fn settle_invalid(spec: &CommandSpecification, cmd: &ParsedCommand) -> Output {
    let converted = match cmd.verb {
        Verb::Create if cmd.exists && cmd.unique => to_update(spec, cmd),
        Verb::Update if !cmd.exists && cmd.unique => to_create(spec, cmd),
        // Re-emitted so a later pass can complete it once both ends exist
        Verb::Link if !cmd.exists && cmd.unique => Some(cmd.source.clone()),
        _ => None,
    };
    match converted {
        Some(text) => {
            let verb = match cmd.verb {
                Verb::Create => Verb::Update,
                Verb::Update => Verb::Create,
                other => other,
            };
            tracing::info!(
                target: "quill::executor",
                command = %spec.name,
                from = %cmd.verb,
                to = %verb,
                "Block converted"
            );
            Output::Converted { verb, text }
        }
        None => {
            let reason = cmd.reason_text();
            tracing::warn!(target: "quill::executor", command = %spec.name, reason = %reason, "Block skipped");
            Output::Skipped { reason }
        }
    }
}

/// Object type to write after `verb` in a rewritten header.
///
/// Keeps the author's wording when the family answers to it under `verb`
/// (`Create Vocabulary` becomes `Update Vocabulary`), otherwise falls back to
/// the canonical object type.
fn object_type_for(spec: &CommandSpecification, cmd: &ParsedCommand, verb: Verb) -> String {
    let wanted = format!("{} {}", verb, cmd.object_type);
    if spec.all_names().any(|n| n.eq_ignore_ascii_case(&wanted)) {
        cmd.object_type.clone()
    } else {
        spec.object_type().to_string()
    }
}

fn identity_labels(spec: &CommandSpecification, style: AttributeStyle, fallback: &str) -> Vec<String> {
    spec.attributes
        .iter()
        .find(|a| a.style == style)
        .map(|a| a.synonym_labels.clone())
        .unwrap_or_else(|| vec![fallback.to_string()])
}

/// Create block for an entity that already exists: rewrite as an Update
/// carrying the resolved identity.
fn to_update(spec: &CommandSpecification, cmd: &ParsedCommand) -> Option<String> {
    let qn = cmd.qualified_name.as_deref()?;
    let guid = cmd.guid.as_ref()?;
    let qn_labels = identity_labels(spec, AttributeStyle::Qn, "Qualified Name");
    let id_labels = identity_labels(spec, AttributeStyle::Id, "GUID");

    let text = replace_header(&cmd.source, Verb::Update, &object_type_for(spec, cmd, Verb::Update));
    let text = set_section(&text, &qn_labels, &qn_labels[0], qn);
    Some(set_section(&text, &id_labels, &id_labels[0], guid.as_str()))
}

/// Update block for an entity that does not exist: rewrite as a Create,
/// dropping the stale GUID. A display name alone is enough; the Create
/// synthesizes the qualified name.
fn to_create(spec: &CommandSpecification, cmd: &ParsedCommand) -> Option<String> {
    if cmd.qualified_name.is_none() && cmd.display_name.is_none() {
        return None;
    }
    let id_labels = identity_labels(spec, AttributeStyle::Id, "GUID");
    let text = replace_header(&cmd.source, Verb::Create, &object_type_for(spec, cmd, Verb::Create));
    Some(remove_section(&text, &id_labels))
}

/// Whether an attribute is sent to the catalog as an entity property.
fn is_property(key: &str, style: &AttributeStyle) -> bool {
    !style.is_identity()
        && !style.is_reference()
        && key != PARENT_RELATIONSHIP_KEY
        && key != PARENT_AT_END1_KEY
        && key != MERGE_UPDATE_KEY
}

/// Catalog properties for the command's anchor entity.
pub fn properties(spec: &CommandSpecification, cmd: &ParsedCommand) -> Properties {
    let mut props = Properties::new();
    for attr in &spec.attributes {
        if !is_property(&attr.key, &attr.style) {
            continue;
        }
        let value = cmd.value(&attr.key);
        if value.is_missing() {
            continue;
        }
        props.insert(attr.property(), value.to_json());
    }
    if let Some(qn) = &cmd.qualified_name {
        props.insert("qualifiedName".into(), qn.as_str().into());
    }
    props
}

/// Whether an Update replaces stored properties instead of merging.
pub fn replace_all(cmd: &ParsedCommand) -> bool {
    cmd.value(MERGE_UPDATE_KEY).as_bool() == Some(false)
}
