//! Entity resolution
//!
//! Turns a name written in a document into a verdict about a catalog entity:
//! its qualified name, its GUID if it exists, whether the name was unique,
//! and whether that state is acceptable for what the command wants to do.
//!
//! Lookup order:
//! 1. Reference cache (qualified name, then display name). A hit with a GUID
//!    costs no catalog call.
//! 2. A cached qualified name without a GUID is looked up remotely by that
//!    qualified name.
//! 3. Otherwise the catalog is searched by name. Several distinct matches
//!    make the name ambiguous; it is never resolved silently.
//!
//! The action overlay then decides validity: a Create wants the entity to be
//! absent, everything else wants it present.

use quill_core::{Action, CatalogClient, EntityMatch, EntityRecord, Error, Guid, Result};

use crate::cache::CacheLookup;
use crate::context::ProcessingContext;

/// How to build a qualified name for an entity that does not exist yet.
#[derive(Debug, Clone, Copy)]
pub struct Synthesis<'a> {
    /// Command-level qualified name prefix
    pub prefix: &'a str,
    /// Optional version token appended to the name
    pub version: Option<&'a str>,
}

/// Verdict for one resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved, supplied or synthesized qualified name
    pub qualified_name: Option<String>,
    /// GUID when the entity exists
    pub guid: Option<Guid>,
    /// Display name known for the entity
    pub display_name: Option<String>,
    /// False when the name matched several entities
    pub unique: bool,
    /// `None` when ambiguity prevents an answer
    pub exists: Option<bool>,
    /// Whether existence agrees with the requested action
    pub valid: bool,
    /// Diagnostic text
    pub reason: Option<String>,
    /// True if `qualified_name` was synthesized here
    pub synthesized: bool,
}

impl Resolution {
    fn found(m: &EntityMatch) -> Self {
        Self {
            qualified_name: Some(m.qualified_name.clone()),
            guid: Some(m.guid.clone()),
            display_name: Some(m.display_name.clone()).filter(|d| !d.is_empty()),
            unique: true,
            exists: Some(true),
            valid: true,
            reason: None,
            synthesized: false,
        }
    }

    fn absent(qualified_name: Option<String>) -> Self {
        Self {
            qualified_name,
            guid: None,
            display_name: None,
            unique: true,
            exists: Some(false),
            valid: true,
            reason: None,
            synthesized: false,
        }
    }

    fn ambiguous(name: &str, candidates: &[String]) -> Self {
        Self {
            qualified_name: None,
            guid: None,
            display_name: None,
            unique: false,
            exists: None,
            valid: false,
            reason: Some(ambiguous_reason(name, candidates)),
            synthesized: false,
        }
    }

    /// True when the entity is known to exist.
    pub fn exists(&self) -> bool {
        self.exists == Some(true)
    }
}

/// Reason text for a name that matched more than one entity.
pub fn ambiguous_reason(name: &str, candidates: &[String]) -> String {
    format!(
        "'{}' matches {} entities ({}); supply a Qualified Name to choose one",
        name,
        candidates.len(),
        candidates.join(", ")
    )
}

/// Resolves names against the cache first and the catalog second.
pub struct EntityResolver<'a> {
    ctx: &'a mut ProcessingContext,
    catalog: &'a dyn CatalogClient,
}

impl<'a> EntityResolver<'a> {
    /// Create a resolver over one pass's context.
    pub fn new(ctx: &'a mut ProcessingContext, catalog: &'a dyn CatalogClient) -> Self {
        Self { ctx, catalog }
    }

    /// The context this resolver works in.
    pub fn context(&mut self) -> &mut ProcessingContext {
        self.ctx
    }

    /// Resolve `name` (a display name or qualified name) of `entity_type`
    /// for `action`.
    ///
    /// `synth` is given when the name is a display name of the command's own
    /// anchor; a Create of a missing entity then gets a synthesized qualified
    /// name, which is seeded into the cache. Without it a missing entity keeps
    /// `name` as its qualified name.
    ///
    /// # Errors
    ///
    /// Only catalog faults are errors; every validation outcome is in the
    /// returned `Resolution`.
    pub fn resolve(
        &mut self,
        entity_type: &str,
        name: &str,
        action: Action,
        synth: Option<Synthesis<'_>>,
    ) -> Result<Resolution> {
        let name = name.trim();
        let mut resolution = self.locate(entity_type, name)?;

        if resolution.exists == Some(false) {
            if let Some(s) = synth {
                if action == Action::Create {
                    let qn = self.ctx.synthesize_qualified_name(s.prefix, name, s.version);
                    self.ctx.cache.seed(&qn, name, entity_type);
                    tracing::debug!(target: "quill::resolve", name, qualified_name = %qn, "Synthesized qualified name");
                    resolution.qualified_name = Some(qn);
                    resolution.synthesized = true;
                }
            } else if resolution.qualified_name.is_none() {
                resolution.qualified_name = Some(name.to_string());
            }
        }

        apply_action(&mut resolution, entity_type, name, action);
        Ok(resolution)
    }

    fn locate(&mut self, entity_type: &str, name: &str) -> Result<Resolution> {
        match self.ctx.cache.find(entity_type, name) {
            CacheLookup::Hit {
                qualified_name,
                entry,
            } => match entry.guid {
                Some(guid) => {
                    tracing::trace!(target: "quill::resolve", name, %guid, "Cache hit");
                    Ok(Resolution {
                        display_name: Some(entry.display_name).filter(|d| !d.is_empty()),
                        ..Resolution::found(&EntityMatch {
                            guid,
                            qualified_name,
                            display_name: String::new(),
                            entity_type: entity_type.to_string(),
                        })
                    })
                }
                None => {
                    // Known qualified name, GUID not yet known
                    let matches = self.lookup(entity_type, &qualified_name)?;
                    let mut resolution = self.settle(entity_type, name, matches)?;
                    if resolution.exists == Some(false) {
                        resolution.qualified_name = Some(qualified_name);
                        resolution.display_name = Some(entry.display_name).filter(|d| !d.is_empty());
                    }
                    Ok(resolution)
                }
            },
            CacheLookup::Ambiguous { qualified_names } => {
                Ok(Resolution::ambiguous(name, &qualified_names))
            }
            CacheLookup::Miss => {
                let matches = self.lookup(entity_type, name)?;
                self.settle(entity_type, name, matches)
            }
        }
    }

    fn lookup(&self, entity_type: &str, name: &str) -> Result<Vec<EntityMatch>> {
        tracing::debug!(target: "quill::resolve", entity_type, name, "Catalog lookup");
        self.catalog
            .lookup_by_name(entity_type, name)
            .map_err(|e| Error::catalog("", "lookup", e))
    }

    fn settle(
        &mut self,
        entity_type: &str,
        name: &str,
        mut matches: Vec<EntityMatch>,
    ) -> Result<Resolution> {
        matches.sort_by(|a, b| a.guid.cmp(&b.guid));
        matches.dedup_by(|a, b| a.guid == b.guid);

        match matches.len() {
            0 => Ok(Resolution::absent(None)),
            1 => {
                let m = &matches[0];
                let display = if m.display_name.is_empty() {
                    name
                } else {
                    m.display_name.as_str()
                };
                let stored_type = if m.entity_type.is_empty() {
                    entity_type
                } else {
                    m.entity_type.as_str()
                };
                self.ctx
                    .cache
                    .remember(&m.qualified_name, m.guid.clone(), display, stored_type);
                Ok(Resolution::found(m))
            }
            _ => {
                let mut names: Vec<String> =
                    matches.iter().map(|m| m.qualified_name.clone()).collect();
                names.sort();
                tracing::warn!(target: "quill::resolve", name, candidates = names.len(), "Ambiguous name");
                Ok(Resolution::ambiguous(name, &names))
            }
        }
    }

    /// Fetch an entity by GUID and remember its qualified name.
    ///
    /// Returns `Ok(None)` when the catalog has no such entity.
    pub fn verify_guid(&mut self, entity_type: &str, guid: &Guid) -> Result<Option<EntityRecord>> {
        let record = self
            .catalog
            .lookup_by_guid(entity_type, guid)
            .map_err(|e| Error::catalog("", "lookup", e))?;
        if let Some(rec) = &record {
            if let Some(qn) = rec.qualified_name() {
                self.ctx
                    .cache
                    .remember(
                        qn,
                        rec.guid.clone(),
                        rec.display_name().unwrap_or_default(),
                        &rec.entity_type,
                    );
            }
        }
        Ok(record)
    }
}

fn apply_action(resolution: &mut Resolution, entity_type: &str, name: &str, action: Action) {
    match (action, resolution.exists) {
        (_, None) => resolution.valid = false,
        (Action::Create, Some(true)) => {
            resolution.valid = false;
            resolution.reason = Some(format!("{} '{}' already exists", entity_type, name));
        }
        (Action::Create, Some(false)) => resolution.valid = true,
        (_, Some(true)) => resolution.valid = true,
        (_, Some(false)) => {
            resolution.valid = false;
            resolution.reason = Some(format!("{} '{}' not found", entity_type, name));
        }
    }
}
