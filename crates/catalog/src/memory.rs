//! In-process metadata catalog
//!
//! Keeps entities and relationships in memory behind a mutex and counts
//! every call, so tests can assert exactly how many lookups and mutations a
//! document pass performed. Also used for `--offline` runs.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use quill_core::{
    CatalogClient, CatalogError, CatalogErrorKind, CatalogResult, EntityMatch, EntityRecord, Guid,
    OutputFormat, Properties,
};

use crate::render::render_record;

/// Entity type that matches every stored type.
pub const ANY_TYPE: &str = quill_core::ANY_ENTITY_TYPE;

/// A stored relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Catalog relationship type
    pub relationship_type: String,
    /// First end
    pub end1: Guid,
    /// Second end
    pub end2: Guid,
    /// Relationship properties
    pub properties: Properties,
}

/// Number of calls per catalog operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `lookup_by_name` and `lookup_by_guid`
    pub lookups: usize,
    /// `find`
    pub finds: usize,
    /// `create`
    pub creates: usize,
    /// `update`
    pub updates: usize,
    /// `link`
    pub links: usize,
    /// `detach`
    pub detaches: usize,
    /// `delete`
    pub deletes: usize,
    /// `render`
    pub renders: usize,
}

impl CallCounts {
    /// Total number of mutating calls.
    pub fn mutations(&self) -> usize {
        self.creates + self.updates + self.links + self.detaches + self.deletes
    }

    /// Total number of remote reads (lookups and searches).
    pub fn reads(&self) -> usize {
        self.lookups + self.finds
    }
}

#[derive(Debug, Default)]
struct State {
    entities: BTreeMap<Guid, EntityRecord>,
    relationships: Vec<Relationship>,
    counts: CallCounts,
    fail_next_mutation: Option<CatalogError>,
}

impl State {
    fn entity(&self, entity_type: &str, guid: &Guid) -> Option<&EntityRecord> {
        self.entities
            .get(guid)
            .filter(|e| type_matches(entity_type, &e.entity_type))
    }

    fn take_failure(&mut self) -> CatalogResult<()> {
        match self.fail_next_mutation.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn type_matches(wanted: &str, stored: &str) -> bool {
    wanted == ANY_TYPE || wanted == stored
}

fn name_matches(record: &EntityRecord, name: &str) -> bool {
    ["qualifiedName", "name", "displayName", "title"]
        .iter()
        .any(|p| record.property(p) == Some(name))
}

/// Catalog held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity directly, without counting a call.
    ///
    /// Returns the new GUID.
    pub fn insert(&self, entity_type: &str, qualified_name: &str, display_name: &str) -> Guid {
        let mut props = Properties::new();
        props.insert("qualifiedName".into(), qualified_name.into());
        props.insert("displayName".into(), display_name.into());
        self.insert_with(entity_type, props)
    }

    /// Store an entity with arbitrary properties, without counting a call.
    pub fn insert_with(&self, entity_type: &str, properties: Properties) -> Guid {
        let guid = Guid::new(uuid::Uuid::new_v4().to_string());
        self.state.lock().entities.insert(
            guid.clone(),
            EntityRecord {
                guid: guid.clone(),
                entity_type: entity_type.to_string(),
                properties,
            },
        );
        guid
    }

    /// Snapshot of one entity.
    pub fn entity(&self, guid: &Guid) -> Option<EntityRecord> {
        self.state.lock().entities.get(guid).cloned()
    }

    /// Every entity with `qualified_name`.
    pub fn by_qualified_name(&self, qualified_name: &str) -> Vec<EntityRecord> {
        self.state
            .lock()
            .entities
            .values()
            .filter(|e| e.qualified_name() == Some(qualified_name))
            .cloned()
            .collect()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.state.lock().entities.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all relationships.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.state.lock().relationships.clone()
    }

    /// Calls made so far.
    pub fn counts(&self) -> CallCounts {
        self.state.lock().counts
    }

    /// Zero the call counters.
    pub fn reset_counts(&self) {
        self.state.lock().counts = CallCounts::default();
    }

    /// Make the next mutating call fail with `err`.
    pub fn fail_next_mutation(&self, err: CatalogError) {
        self.state.lock().fail_next_mutation = Some(err);
    }
}

impl CatalogClient for MemoryCatalog {
    fn lookup_by_name(&self, entity_type: &str, name: &str) -> CatalogResult<Vec<EntityMatch>> {
        let mut state = self.state.lock();
        state.counts.lookups += 1;
        Ok(state
            .entities
            .values()
            .filter(|e| type_matches(entity_type, &e.entity_type) && name_matches(e, name))
            .map(EntityRecord::to_match)
            .collect())
    }

    fn lookup_by_guid(&self, entity_type: &str, guid: &Guid) -> CatalogResult<Option<EntityRecord>> {
        let mut state = self.state.lock();
        state.counts.lookups += 1;
        Ok(state.entity(entity_type, guid).cloned())
    }

    fn find(&self, entity_type: &str, search: &str) -> CatalogResult<Vec<EntityMatch>> {
        let mut state = self.state.lock();
        state.counts.finds += 1;
        let needle = search.trim().to_lowercase();
        Ok(state
            .entities
            .values()
            .filter(|e| type_matches(entity_type, &e.entity_type))
            .filter(|e| {
                needle == "*"
                    || needle.is_empty()
                    || [e.qualified_name(), e.display_name()]
                        .iter()
                        .flatten()
                        .any(|v| v.to_lowercase().contains(&needle))
            })
            .map(EntityRecord::to_match)
            .collect())
    }

    fn create(&self, entity_type: &str, properties: &Properties) -> CatalogResult<Guid> {
        let mut state = self.state.lock();
        state.counts.creates += 1;
        state.take_failure()?;

        let qn = properties
            .get("qualifiedName")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CatalogError::new(CatalogErrorKind::Protocol, "qualifiedName is required"))?;
        if state
            .entities
            .values()
            .any(|e| e.qualified_name() == Some(qn))
        {
            return Err(CatalogError::new(
                CatalogErrorKind::Server,
                format!("an entity with qualified name '{}' already exists", qn),
            ));
        }

        let guid = Guid::new(uuid::Uuid::new_v4().to_string());
        state.entities.insert(
            guid.clone(),
            EntityRecord {
                guid: guid.clone(),
                entity_type: entity_type.to_string(),
                properties: properties.clone(),
            },
        );
        tracing::debug!(target: "quill::catalog", entity_type, qualified_name = qn, %guid, "Entity created");
        Ok(guid)
    }

    fn update(
        &self,
        entity_type: &str,
        guid: &Guid,
        properties: &Properties,
        replace_all: bool,
    ) -> CatalogResult<()> {
        let mut state = self.state.lock();
        state.counts.updates += 1;
        state.take_failure()?;

        if state.entity(entity_type, guid).is_none() {
            return Err(CatalogError::not_found(format!("{} {}", entity_type, guid)));
        }
        if let Some(record) = state.entities.get_mut(guid) {
            if replace_all {
                record.properties = properties.clone();
            } else {
                for (k, v) in properties {
                    record.properties.insert(k.clone(), v.clone());
                }
            }
        }
        tracing::debug!(target: "quill::catalog", entity_type, %guid, replace_all, "Entity updated");
        Ok(())
    }

    fn link(
        &self,
        relationship_type: &str,
        end1: &Guid,
        end2: &Guid,
        properties: &Properties,
    ) -> CatalogResult<()> {
        let mut state = self.state.lock();
        state.counts.links += 1;
        state.take_failure()?;

        for end in [end1, end2] {
            if !state.entities.contains_key(end) {
                return Err(CatalogError::not_found(format!("relationship end {}", end)));
            }
        }
        let exists = state.relationships.iter().any(|r| {
            r.relationship_type == relationship_type && r.end1 == *end1 && r.end2 == *end2
        });
        if !exists {
            state.relationships.push(Relationship {
                relationship_type: relationship_type.to_string(),
                end1: end1.clone(),
                end2: end2.clone(),
                properties: properties.clone(),
            });
        }
        tracing::debug!(target: "quill::catalog", relationship_type, %end1, %end2, "Entities linked");
        Ok(())
    }

    fn related(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<bool> {
        let mut state = self.state.lock();
        state.counts.lookups += 1;
        Ok(state.relationships.iter().any(|r| {
            r.relationship_type == relationship_type && r.end1 == *end1 && r.end2 == *end2
        }))
    }

    fn detach(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<()> {
        let mut state = self.state.lock();
        state.counts.detaches += 1;
        state.take_failure()?;

        let before = state.relationships.len();
        state.relationships.retain(|r| {
            !(r.relationship_type == relationship_type && r.end1 == *end1 && r.end2 == *end2)
        });
        if state.relationships.len() == before {
            return Err(CatalogError::not_found(format!(
                "{} relationship between {} and {}",
                relationship_type, end1, end2
            )));
        }
        Ok(())
    }

    fn delete(&self, entity_type: &str, guid: &Guid) -> CatalogResult<()> {
        let mut state = self.state.lock();
        state.counts.deletes += 1;
        state.take_failure()?;

        if state.entity(entity_type, guid).is_none() {
            return Err(CatalogError::not_found(format!("{} {}", entity_type, guid)));
        }
        state.entities.remove(guid);
        state
            .relationships
            .retain(|r| r.end1 != *guid && r.end2 != *guid);
        tracing::debug!(target: "quill::catalog", entity_type, %guid, "Entity deleted");
        Ok(())
    }

    fn render(&self, guid: &Guid, format: OutputFormat) -> CatalogResult<String> {
        let mut state = self.state.lock();
        state.counts.renders += 1;
        let record = state
            .entities
            .get(guid)
            .ok_or_else(|| CatalogError::not_found(format!("entity {}", guid)))?;
        Ok(render_record(record, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(qn: &str, name: &str) -> Properties {
        let mut p = Properties::new();
        p.insert("qualifiedName".into(), qn.into());
        p.insert("displayName".into(), name.into());
        p
    }

    #[test]
    fn test_create_then_lookup() {
        let catalog = MemoryCatalog::new();
        let guid = catalog.create("Glossary", &props("Glossary::G", "G")).unwrap();

        let by_name = catalog.lookup_by_name("Glossary", "G").unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].guid, guid);
        let by_qn = catalog.lookup_by_name("Glossary", "Glossary::G").unwrap();
        assert_eq!(by_qn.len(), 1);
        assert!(catalog.lookup_by_name("GlossaryTerm", "G").unwrap().is_empty());
        assert_eq!(catalog.lookup_by_name(ANY_TYPE, "G").unwrap().len(), 1);

        let counts = catalog.counts();
        assert_eq!(counts.creates, 1);
        assert_eq!(counts.lookups, 4);
        assert_eq!(counts.mutations(), 1);
    }

    #[test]
    fn test_duplicate_qualified_name_rejected() {
        let catalog = MemoryCatalog::new();
        catalog.create("Glossary", &props("Glossary::G", "G")).unwrap();
        let err = catalog.create("Glossary", &props("Glossary::G", "G2")).unwrap_err();
        assert_eq!(err.kind, CatalogErrorKind::Server);
    }

    #[test]
    fn test_update_merge_and_replace() {
        let catalog = MemoryCatalog::new();
        let guid = catalog.insert("Glossary", "Glossary::G", "G");

        let mut extra = Properties::new();
        extra.insert("description".into(), "d".into());
        catalog.update("Glossary", &guid, &extra, false).unwrap();
        let rec = catalog.entity(&guid).unwrap();
        assert_eq!(rec.property("description"), Some("d"));
        assert_eq!(rec.qualified_name(), Some("Glossary::G"));

        catalog.update("Glossary", &guid, &extra, true).unwrap();
        assert_eq!(catalog.entity(&guid).unwrap().qualified_name(), None);

        let missing = Guid::new("nope");
        assert_eq!(
            catalog.update("Glossary", &missing, &extra, false).unwrap_err().kind,
            CatalogErrorKind::NotFound
        );
    }

    #[test]
    fn test_link_detach_delete() {
        let catalog = MemoryCatalog::new();
        let a = catalog.insert("GlossaryTerm", "T::A", "A");
        let b = catalog.insert("GlossaryTerm", "T::B", "B");

        catalog.link("RelatedTerm", &a, &b, &Properties::new()).unwrap();
        catalog.link("RelatedTerm", &a, &b, &Properties::new()).unwrap();
        assert_eq!(catalog.relationships().len(), 1);

        catalog.detach("RelatedTerm", &a, &b).unwrap();
        assert!(catalog.relationships().is_empty());
        assert!(catalog.detach("RelatedTerm", &a, &b).is_err());

        catalog.link("RelatedTerm", &a, &b, &Properties::new()).unwrap();
        catalog.delete("GlossaryTerm", &a).unwrap();
        assert!(catalog.relationships().is_empty());
        assert!(catalog.entity(&a).is_none());
    }

    #[test]
    fn test_find() {
        let catalog = MemoryCatalog::new();
        catalog.insert("Glossary", "Glossary::Parts", "Parts");
        catalog.insert("Glossary", "Glossary::Tools", "Tools");
        catalog.insert("GlossaryTerm", "T::Widget", "Widget");
        assert_eq!(catalog.find("Glossary", "*").unwrap().len(), 2);
        assert_eq!(catalog.find("Glossary", "par").unwrap().len(), 1);
        assert_eq!(catalog.counts().finds, 2);
    }

    #[test]
    fn test_injected_failure_hits_next_mutation_only() {
        let catalog = MemoryCatalog::new();
        catalog.fail_next_mutation(CatalogError::new(CatalogErrorKind::Network, "down"));
        assert!(catalog.lookup_by_name("Glossary", "x").is_ok());
        assert!(catalog.create("Glossary", &props("Glossary::G", "G")).is_err());
        assert!(catalog.create("Glossary", &props("Glossary::G", "G")).is_ok());
    }

    #[test]
    fn test_render_counts() {
        let catalog = MemoryCatalog::new();
        let g = catalog.insert("Glossary", "Glossary::G", "G");
        let text = catalog.render(&g, OutputFormat::List).unwrap();
        assert_eq!(text, "* G (`Glossary::G`)\n");
        assert_eq!(catalog.counts().renders, 1);
        assert_eq!(catalog.counts().mutations(), 0);
    }
}
