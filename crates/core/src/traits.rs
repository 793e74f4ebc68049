//! The metadata catalog contract
//!
//! This module defines the `CatalogClient` trait that every catalog backend
//! implements. The command-processing core only ever talks to the catalog
//! through this trait, so an in-memory catalog and a remote REST catalog are
//! interchangeable.

use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::Guid;

/// Result type for catalog operations
pub type CatalogResult<T> = StdResult<T, CatalogError>;

/// Property bag sent to and returned from the catalog.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Entity type that stands for every catalog type.
pub const ANY_ENTITY_TYPE: &str = "Referenceable";

/// Whether an entity stored as `stored` answers a request for `wanted`.
pub fn entity_type_matches(wanted: &str, stored: &str) -> bool {
    wanted == ANY_ENTITY_TYPE || stored == ANY_ENTITY_TYPE || wanted == stored
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatch {
    /// Catalog identifier
    pub guid: Guid,
    /// Globally unique qualified name
    pub qualified_name: String,
    /// Human-facing name
    pub display_name: String,
    /// Catalog type name
    #[serde(default)]
    pub entity_type: String,
}

/// A full entity as returned by a GUID lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    /// Catalog identifier
    pub guid: Guid,
    /// Catalog type name
    pub entity_type: String,
    /// Stored properties, including `qualifiedName` and `displayName`
    #[serde(default)]
    pub properties: Properties,
}

impl EntityRecord {
    /// Read a string property.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }

    /// The entity's qualified name, if stored.
    pub fn qualified_name(&self) -> Option<&str> {
        self.property("qualifiedName")
    }

    /// The entity's display name, falling back to `name` and `title`.
    pub fn display_name(&self) -> Option<&str> {
        self.property("displayName")
            .or_else(|| self.property("name"))
            .or_else(|| self.property("title"))
    }

    /// Summarize as a search hit.
    pub fn to_match(&self) -> EntityMatch {
        EntityMatch {
            guid: self.guid.clone(),
            qualified_name: self.qualified_name().unwrap_or_default().to_string(),
            display_name: self.display_name().unwrap_or_default().to_string(),
            entity_type: self.entity_type.clone(),
        }
    }
}

/// Rendering formats understood by `CatalogClient::render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    /// Markdown element block
    #[default]
    Md,
    /// Markdown block shaped as an editable command form
    Form,
    /// Markdown report
    Report,
    /// Markdown bullet list
    List,
    /// Markdown table
    Table,
    /// Key/value dictionary (JSON object)
    Dict,
    /// Full JSON
    Json,
}

impl OutputFormat {
    /// Upper-case name as written in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Md => "MD",
            OutputFormat::Form => "FORM",
            OutputFormat::Report => "REPORT",
            OutputFormat::List => "LIST",
            OutputFormat::Table => "TABLE",
            OutputFormat::Dict => "DICT",
            OutputFormat::Json => "JSON",
        }
    }

    /// Every format, in documentation order.
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Md,
            OutputFormat::Form,
            OutputFormat::Report,
            OutputFormat::List,
            OutputFormat::Table,
            OutputFormat::Dict,
            OutputFormat::Json,
        ]
    }

    /// Parse a format name case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Capability set the command-processing core needs from a catalog.
///
/// All methods take `&self`; implementations that hold mutable state are
/// expected to use interior mutability. Every failure is a `CatalogError`,
/// which the core treats as "this block did not succeed".
pub trait CatalogClient {
    /// Find entities of `entity_type` whose qualifiedName, name, displayName
    /// or title equals `name` exactly.
    fn lookup_by_name(&self, entity_type: &str, name: &str) -> CatalogResult<Vec<EntityMatch>>;

    /// Fetch one entity by GUID; `Ok(None)` when it does not exist.
    fn lookup_by_guid(&self, entity_type: &str, guid: &Guid) -> CatalogResult<Option<EntityRecord>>;

    /// Search entities of `entity_type`; `*` matches everything, other text
    /// matches as a case-insensitive substring of the names.
    fn find(&self, entity_type: &str, search: &str) -> CatalogResult<Vec<EntityMatch>>;

    /// Create an entity and return its new GUID.
    fn create(&self, entity_type: &str, properties: &Properties) -> CatalogResult<Guid>;

    /// Update an entity. With `replace_all` the stored properties are
    /// replaced; otherwise they are merged.
    fn update(
        &self,
        entity_type: &str,
        guid: &Guid,
        properties: &Properties,
        replace_all: bool,
    ) -> CatalogResult<()>;

    /// Create a relationship of `relationship_type` between two entities.
    fn link(
        &self,
        relationship_type: &str,
        end1: &Guid,
        end2: &Guid,
        properties: &Properties,
    ) -> CatalogResult<()>;

    /// Whether a relationship of `relationship_type` runs from `end1` to
    /// `end2`.
    fn related(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<bool>;

    /// Remove a relationship of `relationship_type` between two entities.
    fn detach(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<()>;

    /// Delete an entity.
    fn delete(&self, entity_type: &str, guid: &Guid) -> CatalogResult<()>;

    /// Render an entity for inclusion in an output document.
    fn render(&self, guid: &Guid, format: OutputFormat) -> CatalogResult<String>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn lookup_by_name(&self, entity_type: &str, name: &str) -> CatalogResult<Vec<EntityMatch>> {
        (**self).lookup_by_name(entity_type, name)
    }

    fn lookup_by_guid(&self, entity_type: &str, guid: &Guid) -> CatalogResult<Option<EntityRecord>> {
        (**self).lookup_by_guid(entity_type, guid)
    }

    fn find(&self, entity_type: &str, search: &str) -> CatalogResult<Vec<EntityMatch>> {
        (**self).find(entity_type, search)
    }

    fn create(&self, entity_type: &str, properties: &Properties) -> CatalogResult<Guid> {
        (**self).create(entity_type, properties)
    }

    fn update(
        &self,
        entity_type: &str,
        guid: &Guid,
        properties: &Properties,
        replace_all: bool,
    ) -> CatalogResult<()> {
        (**self).update(entity_type, guid, properties, replace_all)
    }

    fn link(
        &self,
        relationship_type: &str,
        end1: &Guid,
        end2: &Guid,
        properties: &Properties,
    ) -> CatalogResult<()> {
        (**self).link(relationship_type, end1, end2, properties)
    }

    fn related(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<bool> {
        (**self).related(relationship_type, end1, end2)
    }

    fn detach(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<()> {
        (**self).detach(relationship_type, end1, end2)
    }

    fn delete(&self, entity_type: &str, guid: &Guid) -> CatalogResult<()> {
        (**self).delete(entity_type, guid)
    }

    fn render(&self, guid: &Guid, format: OutputFormat) -> CatalogResult<String> {
        (**self).render(guid, format)
    }
}
