//! Meilisearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! on top of the Meilisearch REST API.

mod client;
mod config;
mod tasks;

pub use client::MeilisearchClient;
pub use config::{MeilisearchConfig, DEFAULT_MEILISEARCH_URL};
