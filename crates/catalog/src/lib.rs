//! Metadata catalog clients for Quill
//!
//! Two implementations of [`quill_core::CatalogClient`]:
//! - [`MemoryCatalog`]: in-process, call-counting; used offline and in tests
//! - [`HttpCatalog`]: a view server reached over REST
//!
//! Both render entities with [`render_record`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod http;
pub mod memory;
pub mod render;

pub use http::{Credentials, HttpCatalog};
pub use memory::{CallCounts, MemoryCatalog, Relationship, ANY_TYPE};
pub use render::{render_record, title_case};
