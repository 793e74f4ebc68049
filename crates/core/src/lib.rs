//! Core types and traits for Quill
//!
//! This crate defines the foundational types used throughout the system:
//! - Guid, Verb, Directive, UsageLevel, Severity: shared value types
//! - CommandSpecification / AttributeSpec / AttributeStyle: the declarative schema
//! - AttributeValue / AttributeResult / ParsedCommand: parser output
//! - Error / CatalogError: the fault channel
//! - CatalogClient: the contract every metadata catalog backend implements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod parsed;
pub mod spec;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{CatalogError, CatalogErrorKind, Error, Result};
pub use parsed::{AttributeResult, ParsedCommand};
pub use spec::{
    AttributeSpec, AttributeStyle, CommandSpecification, DISPLAY_NAME_KEY,
    PARENT_AT_END1_KEY, PARENT_RELATIONSHIP_KEY, VERSION_KEY,
};
pub use traits::{
    entity_type_matches, CatalogClient, CatalogResult, EntityMatch, EntityRecord, OutputFormat,
    Properties, ANY_ENTITY_TYPE,
};
pub use types::{Action, Directive, Guid, Severity, UsageLevel, Verb};
pub use value::AttributeValue;
