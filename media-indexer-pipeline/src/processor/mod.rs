//! Processor module for the media indexer pipeline.
//!
//! Projects raw source records into the documents stored in the index.

mod document_mapper;

pub use document_mapper::{DocumentMapper, SkipReason};
