//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (Meilisearch, in-memory, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::{IndexInfo, SearchHits, SearchRequest};
use media_indexer_shared::CatalogItem;

/// Abstracts the underlying search engine.
///
/// Implementations are injected into `IndexManager` to enable dependency
/// injection and testing with in-memory implementations. Every write is
/// expected to be durable (or to have failed) by the time the returned future
/// resolves; engines with asynchronous task queues must wait for the task.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error
/// handling across different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Look up an index by uid.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(IndexInfo))` - If the index exists
    /// * `Ok(None)` - If the engine reports the index as not found
    /// * `Err(SearchIndexError)` - For any other failure
    async fn get_index(&self, uid: &str) -> Result<Option<IndexInfo>, SearchIndexError>;

    /// Create an index with the given primary key.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError::IndexAlreadyExists)` - If the uid is taken
    /// * `Err(SearchIndexError)` - If creation fails
    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<(), SearchIndexError>;

    /// Replace the set of filterable attributes of an index.
    async fn update_filterable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError>;

    /// Replace the set of sortable attributes of an index.
    async fn update_sortable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError>;

    /// Add or replace documents, keyed by `primary_key`.
    ///
    /// Documents whose key already exists are replaced entirely; new keys are
    /// inserted.
    async fn add_documents(
        &self,
        uid: &str,
        primary_key: &str,
        documents: &[CatalogItem],
    ) -> Result<(), SearchIndexError>;

    /// Delete every document of an index, keeping the index and its settings.
    async fn delete_all_documents(&self, uid: &str) -> Result<(), SearchIndexError>;

    /// Delete an index together with its settings and documents.
    async fn delete_index(&self, uid: &str) -> Result<(), SearchIndexError>;

    /// Atomically exchange the contents of two existing indexes.
    async fn swap_indexes(&self, first: &str, second: &str) -> Result<(), SearchIndexError>;

    /// Execute a search request against an index.
    async fn search(&self, uid: &str, request: &SearchRequest)
        -> Result<SearchHits, SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchIndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
