//! Parser output types
//!
//! [`AttributeResult`] is the outcome of one attribute-style processor;
//! [`ParsedCommand`] folds every retained attribute of a block into a single
//! verdict. Both are plain data: an invalid command is a normal value, not an
//! error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Guid, Verb};
use crate::value::AttributeValue;

/// Outcome of processing one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeResult {
    /// Resolved value
    pub value: AttributeValue,
    /// Whether the attribute passed its checks
    pub valid: bool,
    /// Existence of the referenced entity (identifier styles only)
    pub exists: bool,
    /// Diagnostic text when something was off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Resolved qualified name (identifier styles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    /// Resolved GUID (identifier styles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Resolved qualified names (list styles)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_list: Vec<String>,
    /// Resolved GUIDs (list styles)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guid_list: Vec<Guid>,
    /// False when a name matched several catalog entities
    #[serde(default = "default_true")]
    pub unique: bool,
}

fn default_true() -> bool {
    true
}

impl AttributeResult {
    /// A valid result carrying `value`.
    pub fn valid(value: AttributeValue) -> Self {
        Self {
            value,
            valid: true,
            unique: true,
            ..Default::default()
        }
    }

    /// An invalid result carrying `value` and an explanation.
    pub fn invalid(value: AttributeValue, reason: impl Into<String>) -> Self {
        Self {
            value,
            valid: false,
            reason: Some(reason.into()),
            unique: true,
            ..Default::default()
        }
    }

    /// Attach (or extend) the diagnostic text.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.reason = Some(match self.reason.take() {
            Some(existing) => format!("{}; {}", existing, reason),
            None => reason,
        });
        self
    }
}

/// Structured parse of one command block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Canonical command name of the matched specification
    pub command: String,
    /// Verb as written in the block header
    pub verb: Verb,
    /// Object type portion of the command
    pub object_type: String,
    /// AND of all attribute validity and cross-field rules
    pub valid: bool,
    /// Existence of the primary identified entity
    pub exists: bool,
    /// False when the identity was ambiguous
    pub unique: bool,
    /// Resolved or synthesized qualified name of the anchor entity
    pub qualified_name: Option<String>,
    /// GUID of the anchor entity, when it exists
    pub guid: Option<Guid>,
    /// Display name of the anchor entity, when supplied
    pub display_name: Option<String>,
    /// Human-readable echo of what was parsed
    pub display_text: String,
    /// Per-attribute outcomes keyed by attribute key
    pub attributes: BTreeMap<String, AttributeResult>,
    /// Reasons the command is invalid, in attribute order
    pub reasons: Vec<String>,
    /// Notes that do not affect validity
    #[serde(default)]
    pub warnings: Vec<String>,
    /// The raw block text
    pub source: String,
}

impl ParsedCommand {
    /// Create an empty, valid parse for `command`.
    pub fn new(command: impl Into<String>, verb: Verb, object_type: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            verb,
            object_type: object_type.into(),
            valid: true,
            exists: false,
            unique: true,
            qualified_name: None,
            guid: None,
            display_name: None,
            display_text: String::new(),
            attributes: BTreeMap::new(),
            reasons: Vec::new(),
            warnings: Vec::new(),
            source: String::new(),
        }
    }

    /// Borrow one attribute's outcome.
    pub fn attribute(&self, key: &str) -> Option<&AttributeResult> {
        self.attributes.get(key)
    }

    /// Borrow one attribute's value, treating absence as `Missing`.
    pub fn value(&self, key: &str) -> &AttributeValue {
        static MISSING: AttributeValue = AttributeValue::Missing;
        self.attributes
            .get(key)
            .map(|r| &r.value)
            .unwrap_or(&MISSING)
    }

    /// Text of one attribute, if it is present as text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key).as_text()
    }

    /// Mark the command invalid and record why.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        self.valid = false;
        self.reasons.push(reason.into());
    }

    /// Record a note that leaves the command valid.
    pub fn warn(&mut self, note: impl Into<String>) {
        self.warnings.push(note.into());
    }

    /// Invalidating reasons joined for reporting.
    pub fn reason_text(&self) -> String {
        self.reasons.join("; ")
    }

    /// Header line for this command under a (possibly different) verb.
    pub fn header_for(&self, verb: Verb) -> String {
        format!("# {} {}", verb, self.object_type)
    }
}
