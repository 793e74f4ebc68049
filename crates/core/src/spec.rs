//! Declarative command specifications
//!
//! A [`CommandSpecification`] describes one command family: its verb, the
//! catalog type it manages, the names it answers to, and the ordered list of
//! attributes an author may supply. Specifications are loaded once from the
//! command table and never mutated afterwards.
//!
//! # Table format
//!
//! ```json
//! {
//!   "name": "Create Glossary Term",
//!   "verb": "Create",
//!   "family": "Glossary Term",
//!   "entity_type": "GlossaryTerm",
//!   "alternate_names": ["Update Glossary Term", "Create Term"],
//!   "qualified_name_prefix": "GlossaryTerm",
//!   "is_own_anchor": true,
//!   "attributes": [
//!     { "key": "display_name", "style": "Simple",
//!       "labels": ["Display Name", "Term Name"], "input_required": true },
//!     { "key": "glossary", "style": "Reference Name", "entity_type": "Glossary",
//!       "labels": ["In Glossary", "Glossary"], "input_required": true }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{UsageLevel, Verb};

/// Key of the attribute carrying an entity's display name.
pub const DISPLAY_NAME_KEY: &str = "display_name";
/// Key of the attribute carrying an entity's version token.
pub const VERSION_KEY: &str = "version_identifier";
/// Companion of a `Parent` attribute: relationship type to the parent.
pub const PARENT_RELATIONSHIP_KEY: &str = "parent_relationship_type_name";
/// Companion of a `Parent` attribute: whether the parent sits at end 1.
pub const PARENT_AT_END1_KEY: &str = "parent_at_end1";

/// How an attribute's text is interpreted.
///
/// Each variant carries only the configuration it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style")]
pub enum AttributeStyle {
    /// Raw text
    Simple,
    /// Text restricted to a configured set of values
    #[serde(rename = "Valid Value")]
    ValidValue {
        /// Accepted values (compared case-insensitively)
        valid_values: Vec<String>,
    },
    /// `true/yes/1` or `false/no/0`
    Bool,
    /// The command's own qualified name (identity-bearing)
    #[serde(rename = "QN")]
    Qn,
    /// The command's own GUID (identity-bearing)
    #[serde(rename = "ID")]
    Id,
    /// A single reference to another entity by name or qualified name
    #[serde(rename = "Reference Name")]
    ReferenceName {
        /// Catalog type of the referenced entity
        entity_type: String,
    },
    /// Several references to other entities
    #[serde(rename = "Reference Name List")]
    ReferenceNameList {
        /// Catalog type of the referenced entities
        entity_type: String,
    },
    /// A list of plain tokens
    #[serde(rename = "Simple List")]
    SimpleList,
    /// A signed integer
    #[serde(rename = "Simple Int")]
    SimpleInt,
    /// A non-negative ordering position
    #[serde(rename = "Ordered Int")]
    OrderedInt,
    /// A string mapping
    Dictionary,
    /// Free commentary that never invalidates a command
    Comment,
    /// Reference to a parent entity, with companion attributes
    Parent {
        /// Catalog type of the parent
        entity_type: String,
    },
}

impl AttributeStyle {
    /// Whether the style resolves entity references through the catalog.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            AttributeStyle::ReferenceName { .. }
                | AttributeStyle::ReferenceNameList { .. }
                | AttributeStyle::Parent { .. }
        )
    }

    /// Whether the style carries the command's own identity.
    pub fn is_identity(&self) -> bool {
        matches!(self, AttributeStyle::Qn | AttributeStyle::Id)
    }
}

/// One attribute of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Canonical attribute name
    pub key: String,
    /// Interpretation of the attribute text
    #[serde(flatten)]
    pub style: AttributeStyle,
    /// Section labels that may head this attribute, tried in order
    #[serde(rename = "labels")]
    pub synonym_labels: Vec<String>,
    /// Whether the author must supply a value
    #[serde(default)]
    pub input_required: bool,
    /// Visibility tier
    #[serde(default)]
    pub usage_level: UsageLevel,
    /// False for create-only attributes
    #[serde(default = "default_true")]
    pub applies_to_update: bool,
    /// Value used when the section is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Catalog property name; derived from `key` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AttributeSpec {
    /// Create an optional Basic attribute that applies to updates.
    pub fn new(key: impl Into<String>, style: AttributeStyle, labels: &[&str]) -> Self {
        Self {
            key: key.into(),
            style,
            synonym_labels: labels.iter().map(|l| l.to_string()).collect(),
            input_required: false,
            usage_level: UsageLevel::Basic,
            applies_to_update: true,
            default_value: None,
            property_name: None,
        }
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.input_required = true;
        self
    }

    /// Set the usage level.
    pub fn level(mut self, level: UsageLevel) -> Self {
        self.usage_level = level;
        self
    }

    /// Mark the attribute as create-only.
    pub fn create_only(mut self) -> Self {
        self.applies_to_update = false;
        self
    }

    /// Set a default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// The label used when echoing or rewriting this attribute.
    pub fn primary_label(&self) -> &str {
        self.synonym_labels
            .first()
            .map(|s| s.as_str())
            .unwrap_or(self.key.as_str())
    }

    /// Catalog property name (explicit, or `key` in lower camel case).
    pub fn property(&self) -> String {
        match &self.property_name {
            Some(p) => p.clone(),
            None => camel_case(&self.key),
        }
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' || c == ' ' || c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Declarative description of one command family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpecification {
    /// Canonical command name, e.g. `Create Glossary Term`
    pub name: String,
    /// Canonical verb
    pub verb: Verb,
    /// Grouping tag shared by synonymous commands
    pub family: String,
    /// Catalog type name of the anchor entity
    pub entity_type: String,
    /// Synonym command strings
    #[serde(default)]
    pub alternate_names: Vec<String>,
    /// Prefix used when synthesizing qualified names
    #[serde(default)]
    pub qualified_name_prefix: String,
    /// Whether the command manages its own anchor entity
    #[serde(default)]
    pub is_own_anchor: bool,
    /// Relationship type for Link/Detach commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    /// Ordered attribute definitions
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

impl CommandSpecification {
    /// Every name this command answers to, canonical first.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternate_names.iter().map(|s| s.as_str()))
    }

    /// Object type portion of the canonical name (everything after the verb).
    pub fn object_type(&self) -> &str {
        self.name
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or(self.name.as_str())
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.key == key)
    }

    /// The attribute carrying the command's qualified name, if any.
    pub fn qualified_name_attribute(&self) -> Option<&AttributeSpec> {
        self.attributes
            .iter()
            .find(|a| matches!(a.style, AttributeStyle::Qn))
    }

    /// The attribute carrying the command's GUID, if any.
    pub fn guid_attribute(&self) -> Option<&AttributeSpec> {
        self.attributes
            .iter()
            .find(|a| matches!(a.style, AttributeStyle::Id))
    }

    /// Check internal consistency.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("command with empty name".to_string());
        }
        let mut keys = std::collections::HashSet::new();
        for attr in &self.attributes {
            if !keys.insert(attr.key.as_str()) {
                return Err(format!(
                    "command '{}' declares attribute '{}' twice",
                    self.name, attr.key
                ));
            }
            if attr.synonym_labels.is_empty() {
                return Err(format!(
                    "attribute '{}' of '{}' has no labels",
                    attr.key, self.name
                ));
            }
        }
        let qn_count = self
            .attributes
            .iter()
            .filter(|a| matches!(a.style, AttributeStyle::Qn))
            .count();
        if qn_count > 1 {
            return Err(format!(
                "command '{}' has {} qualified-name attributes",
                self.name, qn_count
            ));
        }
        if matches!(self.verb, Verb::Link | Verb::Detach) && self.relationship_type.is_none() {
            return Err(format!(
                "link command '{}' has no relationship_type",
                self.name
            ));
        }
        Ok(())
    }
}
