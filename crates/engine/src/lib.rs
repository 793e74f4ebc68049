//! Command-processing engine for Quill
//!
//! This crate turns document text into parsed commands:
//! - segment: split a document into command blocks and pass-through text
//! - extract: pull labelled sections out of a block
//! - style: interpret section text per attribute style
//! - resolve + cache: find catalog entities by name, memoized per pass
//! - parse: `parse_upsert_command` / `parse_view_command`
//! - table: the declarative command specifications
//! - rewrite: header and section edits used by auto-conversion
//! - config: `quill.toml`
//!
//! Nothing here mutates the catalog; only lookups go through
//! [`quill_core::CatalogClient`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod context;
pub mod extract;
pub mod parse;
pub mod resolve;
pub mod rewrite;
pub mod segment;
pub mod style;
pub mod table;

pub use cache::{CacheEntry, CacheLookup, ReferenceCache};
pub use config::{CatalogConfig, QuillConfig, CONFIG_FILE_NAME};
pub use context::ProcessingContext;
pub use extract::{extract_command_header, extract_section};
pub use parse::{parse_command, parse_upsert_command, parse_view_command};
pub use resolve::{EntityResolver, Resolution, Synthesis};
pub use segment::{segment, segment_with, CommandBlock, Segment};
pub use table::CommandTable;
