//! Attribute-style processors
//!
//! One processor per [`AttributeStyle`]. Every processor sees the same
//! [`Field`]: the extracted text (if any), how seriously a missing value is
//! taken, and a default. Missing `Info`/`Warning` attributes stay valid;
//! missing `Error` attributes do not.
//!
//! Reference styles need the catalog and go through [`EntityResolver`];
//! everything else is pure text handling.

use std::collections::BTreeMap;

use quill_core::{
    Action, AttributeResult, AttributeStyle, AttributeValue, Result, Severity,
};

use crate::resolve::EntityResolver;

/// Input shared by every style processor.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    /// Label the attribute is reported under
    pub label: &'a str,
    /// Extracted body, `None` when no section matched
    pub text: Option<&'a str>,
    /// How a missing value is judged
    pub severity: Severity,
    /// Used when no text was supplied
    pub default: Option<&'a str>,
}

impl<'a> Field<'a> {
    /// Supplied text, or the default when the section is absent or empty.
    pub fn raw(&self) -> Option<&'a str> {
        self.text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or(self.default)
    }

    /// Result for an attribute with no text and no default.
    pub fn missing(&self) -> AttributeResult {
        match self.severity {
            Severity::Error => {
                tracing::warn!(target: "quill::parse", label = self.label, "Required attribute missing");
                AttributeResult::invalid(
                    AttributeValue::Missing,
                    format!("Missing required attribute '{}'", self.label),
                )
            }
            Severity::Warning => {
                tracing::warn!(target: "quill::parse", label = self.label, "Attribute not supplied");
                AttributeResult::valid(AttributeValue::Missing)
                    .with_reason(format!("'{}' not supplied", self.label))
            }
            Severity::Info => {
                tracing::debug!(target: "quill::parse", label = self.label, "Optional attribute absent");
                AttributeResult::valid(AttributeValue::Missing)
            }
        }
    }
}

/// Split list text on semicolons, commas and newlines.
///
/// Items are trimmed, empty items are dropped, order is preserved.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(|c| c == ';' || c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw text or the default.
pub fn process_simple(field: &Field<'_>) -> AttributeResult {
    match field.raw() {
        Some(text) => AttributeResult::valid(AttributeValue::Text(text.to_string())),
        None => field.missing(),
    }
}

/// Text that must be one of `valid_values` (case-insensitive).
///
/// A rejected value is kept so the report can show what was written.
pub fn process_valid_value(field: &Field<'_>, valid_values: &[String]) -> AttributeResult {
    let Some(text) = field.raw() else {
        return field.missing();
    };
    match valid_values.iter().find(|v| v.eq_ignore_ascii_case(text)) {
        Some(canonical) => AttributeResult::valid(AttributeValue::Text(canonical.clone())),
        None => AttributeResult::invalid(
            AttributeValue::Text(text.to_string()),
            format!(
                "'{}' is not a valid value for '{}' (expected one of: {})",
                text,
                field.label,
                valid_values.join(", ")
            ),
        ),
    }
}

/// Parse a boolean word.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// `true/yes/1` or `false/no/0`.
pub fn process_bool(field: &Field<'_>) -> AttributeResult {
    let Some(text) = field.raw() else {
        return field.missing();
    };
    match parse_bool(text) {
        Some(b) => AttributeResult::valid(AttributeValue::Bool(b)),
        None => AttributeResult::invalid(
            AttributeValue::Text(text.to_string()),
            format!("'{}' is not a boolean for '{}'", text, field.label),
        ),
    }
}

/// Ordered list of plain tokens.
pub fn process_simple_list(field: &Field<'_>) -> AttributeResult {
    match field.raw().map(split_list) {
        Some(items) if !items.is_empty() => AttributeResult::valid(AttributeValue::List(items)),
        _ => field.missing(),
    }
}

/// Signed integer; `ordered` additionally rejects negatives.
pub fn process_int(field: &Field<'_>, ordered: bool) -> AttributeResult {
    let Some(text) = field.raw() else {
        return field.missing();
    };
    match text.parse::<i64>() {
        Ok(n) if ordered && n < 0 => AttributeResult::invalid(
            AttributeValue::Int(n),
            format!("'{}' must not be negative", field.label),
        ),
        Ok(n) => AttributeResult::valid(AttributeValue::Int(n)),
        Err(_) => AttributeResult::invalid(
            AttributeValue::Text(text.to_string()),
            format!("'{}' is not an integer for '{}'", text, field.label),
        ),
    }
}

/// Parse a dictionary body.
///
/// Accepts a JSON object, or one `key: value` / `key = value` pair per line.
pub fn parse_dictionary(text: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON object: {}", e))?;
        return Ok(parsed
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect());
    }

    let mut map = BTreeMap::new();
    for line in trimmed.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let split = line.find([':', '=']);
        let Some(at) = split else {
            return Err(format!("expected 'key: value', found '{}'", line));
        };
        let key = line[..at].trim();
        if key.is_empty() {
            return Err(format!("empty key in '{}'", line));
        }
        map.insert(key.to_string(), line[at + 1..].trim().to_string());
    }
    Ok(map)
}

/// String mapping.
pub fn process_dictionary(field: &Field<'_>) -> AttributeResult {
    let Some(text) = field.raw() else {
        return field.missing();
    };
    match parse_dictionary(text) {
        Ok(map) => AttributeResult::valid(AttributeValue::Map(map)),
        Err(reason) => AttributeResult::invalid(
            AttributeValue::Text(text.to_string()),
            format!("'{}': {}", field.label, reason),
        ),
    }
}

/// Free commentary; never invalid.
pub fn process_comment(field: &Field<'_>) -> AttributeResult {
    match field.raw() {
        Some(text) => AttributeResult::valid(AttributeValue::Text(text.to_string())),
        None => AttributeResult::valid(AttributeValue::Missing),
    }
}

/// One reference to an entity of `entity_type`.
pub fn process_reference(
    resolver: &mut EntityResolver<'_>,
    field: &Field<'_>,
    entity_type: &str,
    action: Action,
) -> Result<AttributeResult> {
    let Some(name) = field.raw() else {
        return Ok(field.missing());
    };
    let r = resolver.resolve(entity_type, name, action, None)?;
    let mut result = if r.valid {
        AttributeResult::valid(AttributeValue::Text(name.to_string()))
    } else {
        AttributeResult::invalid(
            AttributeValue::Text(name.to_string()),
            r.reason.clone().unwrap_or_default(),
        )
    };
    result.exists = r.exists();
    result.unique = r.unique;
    result.qualified_name = r.qualified_name;
    result.guid = r.guid;
    Ok(result)
}

/// Several references; valid and existing only if every member is.
pub fn process_reference_list(
    resolver: &mut EntityResolver<'_>,
    field: &Field<'_>,
    entity_type: &str,
) -> Result<AttributeResult> {
    let items = field.raw().map(split_list).unwrap_or_default();
    if items.is_empty() {
        return Ok(field.missing());
    }

    let mut result = AttributeResult::valid(AttributeValue::List(items.clone()));
    result.exists = true;
    for item in &items {
        let r = resolver.resolve(entity_type, item, Action::ExistsRequired, None)?;
        if !r.valid {
            result.valid = false;
            result = result.with_reason(r.reason.clone().unwrap_or_default());
        }
        result.exists &= r.exists();
        result.unique &= r.unique;
        if let Some(qn) = r.qualified_name {
            result.name_list.push(qn);
        }
        if let Some(guid) = r.guid {
            result.guid_list.push(guid);
        }
    }
    Ok(result)
}

/// Run the processor for `style`.
///
/// Identity styles (`QN`, `ID`) only capture their text here; the parser
/// resolves them against the command's own anchor. `reference_action` is
/// the action used for single references (`Link` inside Link commands).
pub fn process_attribute(
    resolver: &mut EntityResolver<'_>,
    style: &AttributeStyle,
    field: &Field<'_>,
    reference_action: Action,
) -> Result<AttributeResult> {
    let result = match style {
        AttributeStyle::Simple | AttributeStyle::Qn | AttributeStyle::Id => process_simple(field),
        AttributeStyle::ValidValue { valid_values } => process_valid_value(field, valid_values),
        AttributeStyle::Bool => process_bool(field),
        AttributeStyle::SimpleList => process_simple_list(field),
        AttributeStyle::SimpleInt => process_int(field, false),
        AttributeStyle::OrderedInt => process_int(field, true),
        AttributeStyle::Dictionary => process_dictionary(field),
        AttributeStyle::Comment => process_comment(field),
        AttributeStyle::ReferenceName { entity_type } | AttributeStyle::Parent { entity_type } => {
            return process_reference(resolver, field, entity_type, reference_action);
        }
        AttributeStyle::ReferenceNameList { entity_type } => {
            return process_reference_list(resolver, field, entity_type);
        }
    };
    Ok(result)
}
