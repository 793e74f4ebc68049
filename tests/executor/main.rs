//! Executor Layer Tests
//!
//! End-to-end tests for the quill-executor crate over an in-memory catalog:
//! - the Widget create/update/ambiguity scenarios
//! - idempotent re-processing of processed output
//! - reference cache consistency across blocks
//! - configuration-driven document processing

mod common;

mod cache_consistency;
mod configuration;
mod idempotence;
mod widget_scenarios;
