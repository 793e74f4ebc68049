//! Core types for Quill
//!
//! This module defines the small value types shared by every layer:
//! - Guid: the catalog's opaque identifier for a persisted entity
//! - Verb: the leading word of a command header
//! - Directive: execution mode (display / validate / process)
//! - UsageLevel: four-tier attribute visibility filter
//! - Severity: how a missing attribute is judged

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Opaque catalog identifier for a persisted entity.
///
/// Quill never interprets GUIDs; they are produced by the catalog and only
/// compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Wrap a catalog-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The verb leading a command header (`# <Verb> <ObjectType>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    /// Create a new entity
    Create,
    /// Update an existing entity
    Update,
    /// Link two existing entities
    Link,
    /// Remove a relationship between two existing entities
    Detach,
    /// Delete an existing entity
    Delete,
    /// Render one or more entities
    View,
    /// Synonym of View that lists entities
    List,
}

impl Verb {
    /// Canonical spelling used in command headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "Create",
            Verb::Update => "Update",
            Verb::Link => "Link",
            Verb::Detach => "Detach",
            Verb::Delete => "Delete",
            Verb::View => "View",
            Verb::List => "List",
        }
    }

    /// Whether the verb reads from the catalog without writing.
    pub fn is_view(&self) -> bool {
        matches!(self, Verb::View | Verb::List)
    }

    /// The resolution action implied by this verb for the command's own anchor.
    pub fn action(&self) -> Action {
        match self {
            Verb::Create => Action::Create,
            Verb::Update => Action::Update,
            Verb::Link | Verb::Detach => Action::Link,
            Verb::Delete | Verb::View | Verb::List => Action::ExistsRequired,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Verb::Create),
            "update" => Ok(Verb::Update),
            "link" | "attach" | "add" => Ok(Verb::Link),
            "detach" | "unlink" | "remove" => Ok(Verb::Detach),
            "delete" => Ok(Verb::Delete),
            "view" => Ok(Verb::View),
            "list" => Ok(Verb::List),
            other => Err(Error::UnknownVerb {
                verb: other.to_string(),
            }),
        }
    }
}

/// What the caller intends to do with a referenced entity.
///
/// Drives the existence overlay of entity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The entity must not exist yet
    Create,
    /// The entity must exist and will be modified
    Update,
    /// The entity must exist and takes part in a relationship
    Link,
    /// The entity must exist; nothing else is implied
    ExistsRequired,
}

/// Execution mode for a document pass.
///
/// Only `Process` may reach a mutating catalog call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    /// Echo the parsed structure, never touch the catalog for writes
    #[default]
    Display,
    /// Resolve and validate, report the verdict
    Validate,
    /// Apply valid commands to the catalog
    Process,
}

impl Directive {
    /// Lower-case name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Display => "display",
            Directive::Validate => "validate",
            Directive::Process => "process",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "display" => Ok(Directive::Display),
            "validate" => Ok(Directive::Validate),
            "process" => Ok(Directive::Process),
            other => Err(Error::InvalidInput {
                reason: format!("unknown directive '{}'", other),
            }),
        }
    }
}

/// Attribute visibility tier.
///
/// Ordered so that `Basic < Advanced < Expert < Invisible`; a parse at a given
/// level considers every attribute whose level is less than or equal to it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum UsageLevel {
    /// Attributes every author is expected to use
    #[default]
    Basic,
    /// Less common attributes
    Advanced,
    /// Attributes for catalog specialists
    Expert,
    /// Internal attributes never offered to authors
    Invisible,
}

impl FromStr for UsageLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(UsageLevel::Basic),
            "advanced" => Ok(UsageLevel::Advanced),
            "expert" => Ok(UsageLevel::Expert),
            "invisible" => Ok(UsageLevel::Invisible),
            other => Err(Error::InvalidInput {
                reason: format!("unknown usage level '{}'", other),
            }),
        }
    }
}

/// How seriously a missing attribute is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Optional; absence is unremarkable
    Info,
    /// Optional, but absence is worth telling the operator about
    Warning,
    /// Required; absence invalidates the command
    Error,
}

impl Severity {
    /// Whether a missing value under this severity invalidates the attribute.
    pub fn invalidates(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}
