//! Command specification table
//!
//! Loads the declarative command schema (JSON) once and answers lookups by
//! any command name or alternate name. Names are matched case-insensitively
//! with whitespace normalized, so `# create   glossary` finds
//! `Create Glossary`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

use quill_core::{CommandSpecification, Error, Result};

use crate::segment::normalize_command;

/// Command table compiled into the binary.
pub const BUILTIN_COMMANDS: &str = include_str!("commands.json");

static BUILTIN: Lazy<std::result::Result<CommandTable, String>> =
    Lazy::new(|| CommandTable::from_json(BUILTIN_COMMANDS).map_err(|e| e.to_string()));

#[derive(Deserialize)]
struct TableFile {
    commands: Vec<CommandSpecification>,
}

/// Immutable set of command specifications.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    specs: Vec<Arc<CommandSpecification>>,
    by_name: HashMap<String, usize>,
}

fn name_key(name: &str) -> String {
    normalize_command(name).to_lowercase()
}

impl CommandTable {
    /// Build a table, rejecting inconsistent specifications and names
    /// claimed by more than one command.
    pub fn new(specs: Vec<CommandSpecification>) -> Result<Self> {
        let mut table = CommandTable::default();
        for spec in specs {
            spec.check().map_err(|reason| Error::CommandTable { reason })?;
            let index = table.specs.len();
            for name in spec.all_names() {
                if let Some(existing) = table.by_name.insert(name_key(name), index) {
                    return Err(Error::CommandTable {
                        reason: format!(
                            "name '{}' is claimed by both '{}' and '{}'",
                            name, table.specs[existing].name, spec.name
                        ),
                    });
                }
            }
            table.specs.push(Arc::new(spec));
        }
        Ok(table)
    }

    /// Parse a JSON table (`{"commands": [...]}`).
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TableFile = serde_json::from_str(json).map_err(|e| Error::CommandTable {
            reason: format!("invalid command table: {}", e),
        })?;
        Self::new(file.commands)
    }

    /// Read a JSON table from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::CommandTable {
            reason: format!("Failed to read command table '{}': {}", path.display(), e),
        })?;
        let table = Self::from_json(&json)?;
        tracing::info!(target: "quill::config", path = %path.display(), commands = table.len(), "Loaded command table");
        Ok(table)
    }

    /// The built-in table.
    pub fn builtin() -> Result<Self> {
        (*BUILTIN).clone().map_err(|reason| Error::CommandTable { reason })
    }

    /// Whether the built-in table has a command called `name`.
    pub fn builtin_knows(name: &str) -> bool {
        BUILTIN.as_ref().is_ok_and(|t| t.get(name).is_some())
    }

    /// The table named by the configuration, or the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    /// Find the specification answering to `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandSpecification>> {
        self.by_name.get(&name_key(name)).map(|&i| &self.specs[i])
    }

    /// Specifications in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandSpecification>> {
        self.specs.iter()
    }

    /// Number of specifications.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Verb;

    #[test]
    fn test_builtin_table_loads() {
        let table = CommandTable::builtin().unwrap();
        assert!(table.len() >= 10);
        let term = table.get("Create Glossary Term").unwrap();
        assert_eq!(term.entity_type, "GlossaryTerm");
        assert_eq!(term.qualified_name_prefix, "GlossaryTerm");
    }

    #[test]
    fn test_alternate_names_share_a_spec() {
        let table = CommandTable::builtin().unwrap();
        let a = table.get("Create Collection").unwrap();
        let b = table.get("create digital   product catalog").unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(table.get("Update Glossary").unwrap().verb, Verb::Create);
        assert!(table.get("Create Spaceship").is_none());
    }

    #[test]
    fn test_link_specs_carry_relationship() {
        let table = CommandTable::builtin().unwrap();
        let link = table.get("Link Term-Term Relationship").unwrap();
        assert_eq!(link.relationship_type.as_deref(), Some("RelatedTerm"));
        let detach = table.get("Unlink Related Terms").unwrap();
        assert_eq!(detach.verb, Verb::Detach);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let json = r#"{"commands": [
            {"name": "Create A", "verb": "Create", "family": "A", "entity_type": "A",
             "attributes": [{"key": "display_name", "style": "Simple", "labels": ["Name"]}]},
            {"name": "Create B", "verb": "Create", "family": "B", "entity_type": "B",
             "alternate_names": ["create a"],
             "attributes": [{"key": "display_name", "style": "Simple", "labels": ["Name"]}]}
        ]}"#;
        let err = CommandTable::from_json(json).unwrap_err();
        assert!(matches!(err, Error::CommandTable { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(CommandTable::from_json("{\"commands\": [{}]}").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        std::fs::write(&path, BUILTIN_COMMANDS).unwrap();
        let table = CommandTable::load(Some(&path)).unwrap();
        assert_eq!(table.len(), CommandTable::builtin().unwrap().len());
    }
}
