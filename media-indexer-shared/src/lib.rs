//! # Media Indexer Shared
//!
//! Types shared by every crate of the media catalog indexer: the normalized
//! [`CatalogItem`] document, the fixed set of [`ContentType`]s the pipeline
//! iterates over, and the query/response types of the search gateway.

mod catalog_item;
mod content_type;
mod search;

pub use catalog_item::{CatalogItem, NameIdPair, PersonInfo};
pub use content_type::{ContentType, UnknownContentType};
pub use search::{SearchQuery, SearchResponse};
