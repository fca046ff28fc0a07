//! # Media Indexer Repository
//!
//! This crate provides the index lifecycle manager for the catalog index and
//! the traits and implementations for talking to the search engine. It
//! includes definitions for errors, the provider interface, and a concrete
//! implementation for Meilisearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod meilisearch;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod queries;
pub mod types;

pub use client::IndexManager;
pub use config::SearchIndexConfig;
pub use errors::{SearchError, SearchIndexError};
pub use interfaces::SearchIndexProvider;
pub use meilisearch::{MeilisearchClient, MeilisearchConfig};
pub use types::IndexSchema;
