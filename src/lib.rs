//! Quill - author metadata-catalog commands in Markdown and apply them
//!
//! A Quill document is ordinary Markdown with command blocks in it:
//!
//! ```text
//! # Create Glossary Term
//! ## Display Name
//! Widget
//! ## Description
//! A small mechanical part.
//! ___
//! ```
//!
//! Each block is parsed against a declarative command table, its references
//! are resolved against the catalog, and depending on the directive it is
//! echoed, validated or applied. Blocks that contradict catalog state are
//! rewritten (a Create of an existing entity becomes an Update) so that
//! re-processing a document never changes the catalog twice.
//!
//! # Quick Start
//!
//! ```ignore
//! use quill::{CommandTable, Directive, DocumentProcessor, Executor, MemoryCatalog};
//!
//! let catalog = MemoryCatalog::new();
//! let executor = Executor::new(&CommandTable::builtin()?, &catalog)?;
//! let report = DocumentProcessor::new(executor, Directive::Process)
//!     .process("glossary.md", &std::fs::read_to_string("glossary.md")?);
//! println!("{}", report.output);
//! ```
//!
//! # Architecture
//!
//! - `quill-core`: shared types, the command specification model and the
//!   [`CatalogClient`] trait
//! - `quill-engine`: segmentation, extraction, parsing, resolution
//! - `quill-catalog`: in-memory and HTTP catalogs
//! - `quill-executor`: registry, handlers and the document driver

pub use quill_catalog::{Credentials, HttpCatalog, MemoryCatalog};
pub use quill_core::{
    CatalogClient, CatalogError, CatalogErrorKind, CommandSpecification, Directive, Error, Guid,
    OutputFormat, ParsedCommand, Result, UsageLevel, Verb,
};
pub use quill_engine::{segment, CommandBlock, CommandTable, ProcessingContext, QuillConfig, Segment};
pub use quill_executor::{DocumentProcessor, DocumentReport, Executor, Output, Registry};
