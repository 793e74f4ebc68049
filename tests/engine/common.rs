//! Shared helpers for the engine tests.

#![allow(dead_code)]

use quill_catalog::MemoryCatalog;
use quill_core::{ParsedCommand, UsageLevel};
use quill_engine::{parse_command, CommandTable, ProcessingContext};

/// Parse `block` with the built-in specification registered as `command`.
pub fn parse_as(catalog: &MemoryCatalog, level: UsageLevel, command: &str, block: &str) -> ParsedCommand {
    let table = CommandTable::builtin().unwrap();
    let spec = table.get(command).unwrap();
    let mut ctx = ProcessingContext::new(level);
    parse_command(&mut ctx, catalog, spec, block).unwrap()
}
