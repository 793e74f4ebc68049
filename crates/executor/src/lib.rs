//! # Quill Executor
//!
//! Turns parsed command blocks into catalog changes and assembles the
//! processed document.
//!
//! - [`Registry`] - command name to specification and handler
//! - [`Executor`] - registry lookup, parse, handler call
//! - [`Output`] - the closed set of per-block results
//! - [`DocumentProcessor`] - whole-document passes and their [`DocumentReport`]
//!
//! ## Directives
//!
//! | Directive | Catalog reads | Catalog writes | Output |
//! |-----------|---------------|----------------|--------|
//! | display | no | no | `Echo` |
//! | validate | yes | no | `Validated` |
//! | process | yes | valid blocks only | `Applied`, `Converted`, `Listed`, `Skipped` |
//!
//! ## Quick Start
//!
//! ```text
//! let catalog = MemoryCatalog::new();
//! let executor = Executor::new(&CommandTable::builtin()?, &catalog)?;
//! let processor = DocumentProcessor::new(executor, Directive::Process);
//! let report = processor.process("glossary.md", &text);
//! if report.should_persist() {
//!     report.write(Path::new("out"), Path::new("glossary.md"), now)?;
//! }
//! ```

#![warn(missing_docs)]

mod document;
mod executor;
mod output;
mod registry;

// Handler modules
pub mod handlers;

// Test modules
#[cfg(test)]
mod tests;

pub use document::{
    has_provenance, output_path, provenance_note, BlockOutcome, DocumentProcessor, DocumentReport,
    SEPARATOR,
};
pub use executor::Executor;
pub use handlers::HandlerContext;
pub use output::Output;
pub use registry::{handler_for, Handler, Registration, Registry};

pub use quill_core::{Error, Result};
