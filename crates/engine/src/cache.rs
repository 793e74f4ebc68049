//! Reference cache
//!
//! Maps qualified names to `{guid, display_name, entity_type}` so that an
//! entity resolved (or created) once during a document pass is found again
//! without a round trip to the catalog. Lookups name the entity type they
//! want; a Glossary and a Glossary Term sharing a display name never answer
//! for each other.
//!
//! Entries are append-only from the parser's point of view: once a qualified
//! name is bound to a GUID, a later attempt to bind it to a different GUID is
//! refused. The cache is owned by a `ProcessingContext`; there is no global
//! instance.

use std::collections::HashMap;

use quill_core::{entity_type_matches, Guid};

/// One cached entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// GUID, or `None` for a qualified name seeded before the entity exists
    pub guid: Option<Guid>,
    /// Display name the entity was referenced by
    pub display_name: String,
    /// Catalog type the entity was resolved or created as
    pub entity_type: String,
}

/// Result of looking a name up in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Nothing known under this name
    Miss,
    /// Exactly one qualified name matches
    Hit {
        /// The matching qualified name
        qualified_name: String,
        /// Its entry
        entry: CacheEntry,
    },
    /// The display name maps to several distinct GUIDs
    Ambiguous {
        /// All matching qualified names, sorted
        qualified_names: Vec<String>,
    },
}

/// Process-local name to GUID memo, scoped to one document pass.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    entries: HashMap<String, CacheEntry>,
}

impl ReferenceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached qualified names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Only called between independent runs.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry stored under an exact qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<&CacheEntry> {
        self.entries.get(qualified_name)
    }

    /// Find an entity of `entity_type` whose cached qualified name or
    /// display name is `name`.
    ///
    /// A display name shared by entries with different GUIDs is reported as
    /// ambiguous. Entries sharing a display name where only one has a GUID
    /// (or all share the same GUID) resolve to that one.
    pub fn find(&self, entity_type: &str, name: &str) -> CacheLookup {
        let wanted = |e: &CacheEntry| entity_type_matches(entity_type, &e.entity_type);
        if let Some(entry) = self.entries.get(name).filter(|e| wanted(e)) {
            return CacheLookup::Hit {
                qualified_name: name.to_string(),
                entry: entry.clone(),
            };
        }

        let mut candidates: Vec<(&String, &CacheEntry)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.display_name == name && wanted(e))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        match candidates.len() {
            0 => CacheLookup::Miss,
            1 => {
                let (qn, entry) = candidates[0];
                CacheLookup::Hit {
                    qualified_name: qn.clone(),
                    entry: entry.clone(),
                }
            }
            _ => {
                let mut guids: Vec<&Guid> =
                    candidates.iter().filter_map(|(_, e)| e.guid.as_ref()).collect();
                guids.sort();
                guids.dedup();
                if guids.len() > 1 {
                    return CacheLookup::Ambiguous {
                        qualified_names: candidates.iter().map(|(qn, _)| (*qn).clone()).collect(),
                    };
                }
                let (qn, entry) = candidates
                    .iter()
                    .find(|(_, e)| e.guid.is_some())
                    .copied()
                    .unwrap_or(candidates[0]);
                CacheLookup::Hit {
                    qualified_name: qn.clone(),
                    entry: entry.clone(),
                }
            }
        }
    }

    /// Record that `qualified_name` is bound to `guid`.
    ///
    /// Fills in a seeded entry's missing GUID. Returns `false` (and leaves the
    /// cache untouched) if the name is already bound to a different GUID.
    pub fn remember(
        &mut self,
        qualified_name: &str,
        guid: Guid,
        display_name: &str,
        entity_type: &str,
    ) -> bool {
        match self.entries.get_mut(qualified_name) {
            Some(existing) => match &existing.guid {
                Some(current) if *current != guid => {
                    tracing::warn!(
                        target: "quill::cache",
                        qualified_name,
                        cached = %current,
                        offered = %guid,
                        "Refusing to rebind cached qualified name to a different GUID"
                    );
                    false
                }
                _ => {
                    existing.guid = Some(guid);
                    if existing.display_name.is_empty() {
                        existing.display_name = display_name.to_string();
                    }
                    if existing.entity_type.is_empty() {
                        existing.entity_type = entity_type.to_string();
                    }
                    true
                }
            },
            None => {
                self.entries.insert(
                    qualified_name.to_string(),
                    CacheEntry {
                        guid: Some(guid),
                        display_name: display_name.to_string(),
                        entity_type: entity_type.to_string(),
                    },
                );
                true
            }
        }
    }

    /// Drop the entry for a deleted entity.
    pub fn forget(&mut self, qualified_name: &str) -> Option<CacheEntry> {
        self.entries.remove(qualified_name)
    }

    /// Record a qualified name whose GUID is not known yet.
    ///
    /// Used when a Create command synthesizes a qualified name, so later
    /// blocks in the same pass resolve the new entity consistently. Existing
    /// entries are left alone.
    pub fn seed(&mut self, qualified_name: &str, display_name: &str, entity_type: &str) {
        self.entries
            .entry(qualified_name.to_string())
            .or_insert_with(|| CacheEntry {
                guid: None,
                display_name: display_name.to_string(),
                entity_type: entity_type.to_string(),
            });
    }
}
