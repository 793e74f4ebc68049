//! Command parsing
//!
//! Drives a [`CommandSpecification`] across the style processors to turn one
//! block of text into a [`ParsedCommand`].
//!
//! Attributes are visited in declaration order. An attribute is skipped when
//! it is create-only and the block is an Update, or when its usage level is
//! above the context's level; skipped attributes are never reported missing.
//! After the attributes, the command's own identity is resolved (Create,
//! Update and Delete) or derived from its reference ends (Link and Detach),
//! and cross-field rules are checked.

use quill_core::{
    Action, AttributeSpec, AttributeStyle, AttributeValue, CatalogClient, CommandSpecification,
    Error, Guid, OutputFormat, ParsedCommand, Result, Severity, UsageLevel, Verb,
    DISPLAY_NAME_KEY, PARENT_AT_END1_KEY, PARENT_RELATIONSHIP_KEY, VERSION_KEY,
};

use crate::context::ProcessingContext;
use crate::extract::{extract_command_header, extract_section, section_labels};
use crate::resolve::{EntityResolver, Synthesis};
use crate::style::{process_attribute, Field};

/// Key of the search text attribute of View commands.
pub const SEARCH_STRING_KEY: &str = "search_string";
/// Key of the output format attribute of View commands.
pub const OUTPUT_FORMAT_KEY: &str = "output_format";

/// Split a block's header into its verb and object type.
pub fn split_header(block: &str) -> Result<(Verb, String)> {
    let header = extract_command_header(block).ok_or_else(|| Error::MalformedBlock {
        reason: "block has no '# <Verb> <Object Type>' header".to_string(),
    })?;
    let (verb, object_type) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header.as_str(), ""));
    let verb: Verb = verb.parse()?;
    let object_type = object_type.split_whitespace().collect::<Vec<_>>().join(" ");
    if object_type.is_empty() {
        return Err(Error::MalformedBlock {
            reason: format!("header '{}' names no object type", header),
        });
    }
    Ok((verb, object_type))
}

/// Severity of a missing attribute for a block with header verb `verb`.
pub fn missing_severity(attr: &AttributeSpec, verb: Verb) -> Severity {
    if attr.input_required {
        Severity::Error
    } else if attr.style.is_identity() && verb == Verb::Update {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// Whether `attr` takes part in a parse of a `verb` block at `level`.
pub fn is_retained(attr: &AttributeSpec, verb: Verb, level: UsageLevel) -> bool {
    if verb == Verb::Update && !attr.applies_to_update {
        return false;
    }
    attr.usage_level <= level
}

fn echo_line(out: &mut String, label: &str, value: &AttributeValue) {
    if value.is_missing() {
        return;
    }
    let text = value.to_string();
    if text.contains('\n') {
        out.push_str(&format!("* **{}**:\n", label));
        for line in text.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    } else {
        out.push_str(&format!("* **{}**: {}\n", label, text));
    }
}

/// Process every retained attribute of `spec` found in `block`.
fn parse_attributes(
    resolver: &mut EntityResolver<'_>,
    spec: &CommandSpecification,
    block: &str,
    cmd: &mut ParsedCommand,
    level: UsageLevel,
) -> Result<()> {
    let reference_action = match cmd.verb {
        Verb::Link | Verb::Detach => Action::Link,
        _ => Action::ExistsRequired,
    };

    let mut echo = format!("{}\n", cmd.header_for(cmd.verb));
    let mut known_labels: Vec<String> = Vec::new();

    for attr in &spec.attributes {
        known_labels.extend(attr.synonym_labels.iter().map(|l| l.to_lowercase()));
        if !is_retained(attr, cmd.verb, level) {
            continue;
        }
        let text = extract_section(block, &attr.synonym_labels);
        let field = Field {
            label: attr.primary_label(),
            text: text.as_deref(),
            severity: missing_severity(attr, cmd.verb),
            default: attr.default_value.as_deref(),
        };
        let result = process_attribute(resolver, &attr.style, &field, reference_action)
            .map_err(|e| e.in_command(&spec.name))?;

        if let Some(reason) = &result.reason {
            if result.valid {
                cmd.warn(reason.clone());
            } else {
                cmd.invalidate(reason.clone());
            }
        }
        echo_line(&mut echo, attr.primary_label(), &result.value);
        cmd.attributes.insert(attr.key.clone(), result);
    }

    for label in section_labels(block) {
        if !known_labels.contains(&label.to_lowercase()) {
            tracing::debug!(target: "quill::parse", command = %spec.name, label = %label, "Ignoring unrecognized section");
        }
    }

    cmd.display_text = echo;
    Ok(())
}

/// Resolve the anchor entity of a Create, Update or Delete command.
fn resolve_identity(
    resolver: &mut EntityResolver<'_>,
    spec: &CommandSpecification,
    cmd: &mut ParsedCommand,
) -> Result<()> {
    let action = cmd.verb.action();
    let qn_key = spec.qualified_name_attribute().map(|a| a.key.clone());
    let supplied_qn = qn_key
        .as_deref()
        .and_then(|k| cmd.text(k))
        .map(str::to_string);
    let display = cmd.text(DISPLAY_NAME_KEY).map(str::to_string);
    let version = cmd.text(VERSION_KEY).map(str::to_string);

    let resolution = match (&supplied_qn, &display) {
        (Some(qn), _) => resolver.resolve(&spec.entity_type, qn, action, None)?,
        (None, Some(name)) => resolver.resolve(
            &spec.entity_type,
            name,
            action,
            Some(Synthesis {
                prefix: &spec.qualified_name_prefix,
                version: version.as_deref(),
            }),
        )?,
        (None, None) => {
            cmd.exists = false;
            cmd.invalidate(format!(
                "No Qualified Name or Display Name identifies the {}",
                cmd.object_type
            ));
            return Ok(());
        }
    };

    cmd.exists = resolution.exists();
    cmd.unique = resolution.unique;
    cmd.qualified_name = resolution.qualified_name.clone();
    cmd.guid = resolution.guid.clone();
    cmd.display_name = display.clone().or_else(|| resolution.display_name.clone());
    if !resolution.valid {
        cmd.invalidate(resolution.reason.clone().unwrap_or_default());
    }

    if let (Some(qn), Some(name), Some(false)) = (&supplied_qn, &display, resolution.exists) {
        // New entity under an author-supplied qualified name
        resolver.context().cache.seed(qn, name, &spec.entity_type);
    }

    if let Some(key) = &qn_key {
        if let Some(attr) = cmd.attributes.get_mut(key) {
            attr.exists = cmd.exists;
            attr.unique = cmd.unique;
            attr.qualified_name = cmd.qualified_name.clone();
            attr.guid = cmd.guid.clone();
        }
    }

    if let Some(id_attr) = spec.guid_attribute() {
        let supplied = cmd.text(&id_attr.key).map(Guid::from);
        if let Some(guid) = supplied {
            verify_identity_guid(resolver, spec, cmd, &id_attr.key, guid)?;
        }
    }
    Ok(())
}

fn verify_identity_guid(
    resolver: &mut EntityResolver<'_>,
    spec: &CommandSpecification,
    cmd: &mut ParsedCommand,
    key: &str,
    guid: Guid,
) -> Result<()> {
    let record = resolver
        .verify_guid(&spec.entity_type, &guid)
        .map_err(|e| e.in_command(&spec.name))?;

    let problem = match (&record, &cmd.guid) {
        (None, _) => Some(format!("GUID {} not found in the catalog", guid)),
        (Some(_), Some(resolved)) if *resolved != guid => Some(format!(
            "GUID {} does not match {} (resolved to {})",
            guid,
            cmd.qualified_name.as_deref().unwrap_or("the named entity"),
            resolved
        )),
        (Some(rec), None) if cmd.unique => Some(format!(
            "GUID {} belongs to '{}', not to the named {}",
            guid,
            rec.qualified_name().unwrap_or_default(),
            cmd.object_type
        )),
        _ => None,
    };

    if let Some(attr) = cmd.attributes.get_mut(key) {
        attr.guid = Some(guid);
        attr.exists = record.is_some();
        if let Some(p) = &problem {
            attr.valid = false;
            attr.reason = Some(p.clone());
        }
    }
    if let Some(p) = problem {
        cmd.invalidate(p);
    }
    Ok(())
}

/// Derive existence of a Link/Detach command from its reference ends.
fn link_identity(spec: &CommandSpecification, cmd: &mut ParsedCommand) {
    let mut exists = true;
    let mut unique = true;
    let mut ends = 0;
    for attr in spec
        .attributes
        .iter()
        .filter(|a| matches!(a.style, AttributeStyle::ReferenceName { .. }))
    {
        if let Some(r) = cmd.attributes.get(&attr.key) {
            exists &= r.exists;
            unique &= r.unique;
            ends += 1;
        }
    }
    cmd.exists = ends > 0 && exists;
    cmd.unique = unique;
}

/// A Parent reference needs its companion attributes and an existing parent.
fn check_parent(spec: &CommandSpecification, cmd: &mut ParsedCommand) {
    let parents: Vec<(String, String)> = spec
        .attributes
        .iter()
        .filter(|a| matches!(a.style, AttributeStyle::Parent { .. }))
        .map(|a| (a.key.clone(), a.primary_label().to_string()))
        .collect();

    for (key, label) in parents {
        let Some(parent) = cmd.attributes.get(&key) else {
            continue;
        };
        if parent.value.is_missing() {
            continue;
        }
        let parent_exists = parent.exists;
        let parent_name = parent.value.to_string();
        let companions_present = [PARENT_RELATIONSHIP_KEY, PARENT_AT_END1_KEY]
            .iter()
            .all(|k| cmd.attributes.get(*k).is_some_and(|r| !r.value.is_missing()));

        if !companions_present {
            cmd.invalidate(format!(
                "'{}' requires 'Parent Relationship Type Name' and 'Parent at End1'",
                label
            ));
        }
        if !parent_exists {
            cmd.invalidate(format!("Parent '{}' must already exist", parent_name));
        }
    }
}

fn finish(spec: &CommandSpecification, cmd: &ParsedCommand) {
    if cmd.valid {
        tracing::debug!(
            target: "quill::parse",
            command = %spec.name,
            verb = %cmd.verb,
            exists = cmd.exists,
            qualified_name = cmd.qualified_name.as_deref().unwrap_or(""),
            "Command parsed"
        );
    } else {
        tracing::warn!(
            target: "quill::parse",
            command = %spec.name,
            verb = %cmd.verb,
            reasons = %cmd.reason_text(),
            "Command invalid"
        );
    }
}

/// Parse a Create, Update, Link, Detach or Delete block.
///
/// Validation problems make the returned command invalid; only catalog
/// faults and unreadable headers are errors.
pub fn parse_upsert_command(
    ctx: &mut ProcessingContext,
    catalog: &dyn CatalogClient,
    spec: &CommandSpecification,
    block: &str,
) -> Result<ParsedCommand> {
    let (verb, object_type) = split_header(block)?;
    let mut cmd = ParsedCommand::new(&spec.name, verb, object_type);
    cmd.source = block.to_string();

    let level = ctx.usage_level;
    let mut resolver = EntityResolver::new(ctx, catalog);
    parse_attributes(&mut resolver, spec, block, &mut cmd, level)?;

    match verb {
        Verb::Link | Verb::Detach => link_identity(spec, &mut cmd),
        Verb::View | Verb::List => {
            return Err(Error::MalformedBlock {
                reason: format!("'{}' is a view command", cmd.header_for(verb)),
            })
        }
        _ => resolve_identity(&mut resolver, spec, &mut cmd)
            .map_err(|e| e.in_command(&spec.name))?,
    }
    check_parent(spec, &mut cmd);
    finish(spec, &cmd);
    Ok(cmd)
}

/// Parse a View or List block.
///
/// There is no anchor identity; the attributes describe a search. The
/// output format, when present, must be one the catalog can render.
pub fn parse_view_command(
    ctx: &mut ProcessingContext,
    catalog: &dyn CatalogClient,
    spec: &CommandSpecification,
    block: &str,
) -> Result<ParsedCommand> {
    let (verb, object_type) = split_header(block)?;
    if !verb.is_view() {
        return Err(Error::MalformedBlock {
            reason: format!("'{} {}' is not a view command", verb, object_type),
        });
    }
    let mut cmd = ParsedCommand::new(&spec.name, verb, object_type);
    cmd.source = block.to_string();

    let level = ctx.usage_level;
    let mut resolver = EntityResolver::new(ctx, catalog);
    parse_attributes(&mut resolver, spec, block, &mut cmd, level)?;

    if let Some(format) = cmd.text(OUTPUT_FORMAT_KEY).map(str::to_string) {
        if OutputFormat::parse(&format).is_none() {
            cmd.invalidate(format!("Unknown output format '{}'", format));
        }
    }
    cmd.exists = true;
    finish(spec, &cmd);
    Ok(cmd)
}

/// Parse `block` with the parser matching the specification's verb.
pub fn parse_command(
    ctx: &mut ProcessingContext,
    catalog: &dyn CatalogClient,
    spec: &CommandSpecification,
    block: &str,
) -> Result<ParsedCommand> {
    if spec.verb.is_view() {
        parse_view_command(ctx, catalog, spec, block)
    } else {
        parse_upsert_command(ctx, catalog, spec, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_header() {
        let (verb, object) = split_header("# Update  Glossary   Term\n## Display Name\nX\n").unwrap();
        assert_eq!(verb, Verb::Update);
        assert_eq!(object, "Glossary Term");
    }

    #[test]
    fn test_split_header_errors() {
        assert!(matches!(
            split_header("## Display Name\nX\n"),
            Err(Error::MalformedBlock { .. })
        ));
        assert!(matches!(
            split_header("# Frobnicate Glossary\n"),
            Err(Error::UnknownVerb { .. })
        ));
        assert!(matches!(
            split_header("# Create\n"),
            Err(Error::MalformedBlock { .. })
        ));
    }

    #[test]
    fn test_missing_severity() {
        let required = AttributeSpec::new("display_name", AttributeStyle::Simple, &["Display Name"]).required();
        let qn = AttributeSpec::new("qualified_name", AttributeStyle::Qn, &["Qualified Name"]);
        let plain = AttributeSpec::new("description", AttributeStyle::Simple, &["Description"]);
        assert_eq!(missing_severity(&required, Verb::Create), Severity::Error);
        assert_eq!(missing_severity(&qn, Verb::Update), Severity::Warning);
        assert_eq!(missing_severity(&qn, Verb::Create), Severity::Info);
        assert_eq!(missing_severity(&plain, Verb::Update), Severity::Info);
    }

    #[test]
    fn test_is_retained() {
        let create_only = AttributeSpec::new("glossary", AttributeStyle::Simple, &["Glossary"]).create_only();
        let expert = AttributeSpec::new("aliases", AttributeStyle::SimpleList, &["Aliases"])
            .level(UsageLevel::Expert)
            .required();
        assert!(is_retained(&create_only, Verb::Create, UsageLevel::Basic));
        assert!(!is_retained(&create_only, Verb::Update, UsageLevel::Basic));
        assert!(!is_retained(&expert, Verb::Create, UsageLevel::Basic));
        assert!(!is_retained(&expert, Verb::Create, UsageLevel::Advanced));
        assert!(is_retained(&expert, Verb::Create, UsageLevel::Expert));
        assert!(is_retained(&expert, Verb::Create, UsageLevel::Invisible));
    }
}
