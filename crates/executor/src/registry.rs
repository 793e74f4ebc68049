//! Command registry
//!
//! A flat map from every command name (canonical and alternate) to the
//! specification it parses with and the handler that acts on it. Synonymous
//! names are separate entries sharing one specification and one handler.

use std::collections::HashMap;
use std::sync::Arc;

use quill_core::{CommandSpecification, Directive, Error, ParsedCommand, Result, Verb};
use quill_engine::segment::normalize_command;
use quill_engine::CommandTable;

use crate::handlers::{delete, element, link, term, view, HandlerContext};
use crate::Output;

/// Signature shared by every handler.
pub type Handler = fn(&mut HandlerContext<'_>, &ParsedCommand, Directive) -> Result<Output>;

/// What a command name resolves to.
#[derive(Clone)]
pub struct Registration {
    /// Specification the block is parsed with
    pub spec: Arc<CommandSpecification>,
    /// Handler invoked with the parse
    pub handler: Handler,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("command", &self.spec.name)
            .finish()
    }
}

/// Handler for a specification, chosen by its verb and family.
pub fn handler_for(spec: &CommandSpecification) -> Handler {
    match spec.verb {
        Verb::Create | Verb::Update if spec.family.eq_ignore_ascii_case("Glossary Term") => {
            term::upsert_term
        }
        Verb::Create | Verb::Update => element::upsert_element,
        Verb::Link | Verb::Detach => link::link_relationship,
        Verb::Delete => delete::delete_element,
        Verb::View | Verb::List => view::view_elements,
    }
}

fn key(name: &str) -> String {
    normalize_command(name).to_lowercase()
}

/// Command name to registration map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Registration>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every command of `table` with its family's handler.
    pub fn from_table(table: &CommandTable) -> Result<Self> {
        let mut registry = Self::new();
        for spec in table.iter() {
            registry.register(Arc::clone(spec), handler_for(spec))?;
        }
        tracing::debug!(target: "quill::executor", names = registry.len(), "Registry built");
        Ok(registry)
    }

    /// Register `spec` under all of its names.
    ///
    /// # Errors
    ///
    /// Fails if any name is already taken; nothing is registered then.
    pub fn register(&mut self, spec: Arc<CommandSpecification>, handler: Handler) -> Result<()> {
        if let Some(taken) = spec.all_names().find(|n| self.entries.contains_key(&key(n))) {
            return Err(Error::CommandTable {
                reason: format!("command name '{}' is registered twice", taken),
            });
        }
        let names: Vec<String> = spec.all_names().map(key).collect();
        for name in names {
            self.entries.insert(
                name,
                Registration {
                    spec: Arc::clone(&spec),
                    handler,
                },
            );
        }
        Ok(())
    }

    /// Look up a command as written in a block header.
    pub fn get(&self, command: &str) -> Option<&Registration> {
        self.entries.get(&key(command))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Distinct specifications, in canonical-name order.
    pub fn specifications(&self) -> Vec<Arc<CommandSpecification>> {
        let mut specs: Vec<Arc<CommandSpecification>> = Vec::new();
        for reg in self.entries.values() {
            if !specs.iter().any(|s| Arc::ptr_eq(s, &reg.spec)) {
                specs.push(Arc::clone(&reg.spec));
            }
        }
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
