//! Shared helpers for the executor tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

pub use quill_catalog::MemoryCatalog;
pub use quill_core::{Directive, UsageLevel};
pub use quill_engine::{segment, CommandBlock, CommandTable, ProcessingContext, Segment};
pub use quill_executor::{DocumentProcessor, DocumentReport, Executor, Output};

pub const WIDGET: &str =
    "# Create Glossary Term\n## Display Name\nWidget\n## Description\nA small mechanical part.\n___\n";

/// Executor over the builtin table.
pub fn executor(catalog: &MemoryCatalog) -> Executor<&MemoryCatalog> {
    Executor::new(&CommandTable::builtin().unwrap(), catalog).unwrap()
}

/// Processor at the basic level.
pub fn processor(catalog: &MemoryCatalog, directive: Directive) -> DocumentProcessor<&MemoryCatalog> {
    DocumentProcessor::new(executor(catalog), directive)
}

/// Every command block of `doc`, in order.
pub fn blocks(doc: &str) -> Vec<CommandBlock> {
    segment(doc)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Command(b) => Some(b),
            Segment::Text(_) => None,
        })
        .collect()
}

/// A fixed timestamp for provenance notes.
pub fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Run one pass over `doc` in a fresh basic-level context.
pub fn run(catalog: &MemoryCatalog, directive: Directive, doc: &str) -> DocumentReport {
    let processor = processor(catalog, directive);
    let mut ctx = processor.new_context();
    processor.process_at(&mut ctx, "doc.md", doc, stamp())
}
