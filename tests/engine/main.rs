//! Engine Layer Tests
//!
//! Tests for the quill-engine crate which provides:
//! - segment: documents into command blocks and text
//! - extract: labelled sections of a block
//! - parse: blocks into `ParsedCommand`s against a catalog
//! - table: the built-in command specifications

mod common;

mod labels;
mod parsing;
mod segmentation;
