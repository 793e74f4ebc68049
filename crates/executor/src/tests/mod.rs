//! Test modules for the executor crate.

pub mod documents;

use quill_catalog::MemoryCatalog;
use quill_core::UsageLevel;
use quill_engine::{segment, CommandBlock, CommandTable, ProcessingContext, Segment};

use crate::Executor;

/// Executor over the builtin command table.
pub(crate) fn executor(catalog: &MemoryCatalog) -> Executor<&MemoryCatalog> {
    Executor::new(&CommandTable::builtin().unwrap(), catalog).unwrap()
}

/// The first command block of `text`.
pub(crate) fn block(text: &str) -> CommandBlock {
    segment(text)
        .into_iter()
        .find_map(|s| match s {
            Segment::Command(b) => Some(b),
            Segment::Text(_) => None,
        })
        .expect("text has a command block")
}

pub(crate) fn basic() -> ProcessingContext {
    ProcessingContext::new(UsageLevel::Basic)
}

pub(crate) fn advanced() -> ProcessingContext {
    ProcessingContext::new(UsageLevel::Advanced)
}

pub(crate) const WIDGET: &str =
    "# Create Glossary Term\n## Display Name\nWidget\n## Description\nA small mechanical part.\n___\n";
