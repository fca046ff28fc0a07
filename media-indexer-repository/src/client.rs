//! Index manager implementation.
//!
//! This module provides the main client for the catalog index. Application
//! code uses it to provision the index, write and clear documents, and query.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::config::SearchIndexConfig;
use crate::errors::{SearchError, SearchIndexError};
use crate::interfaces::SearchIndexProvider;
use crate::queries::build_search_request;
use crate::types::IndexSchema;
use media_indexer_shared::{CatalogItem, SearchQuery, SearchResponse};

/// Owner of the catalog index and its schema.
///
/// Cloning is cheap; clones share the same provider.
#[derive(Clone)]
pub struct IndexManager {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl IndexManager {
    /// Create a new IndexManager with default configuration.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new IndexManager with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// A manager for the staging copy of this index, sharing the provider.
    pub fn staging(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.staging(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.config.schema
    }

    /// Make sure the index exists and carries the declared schema.
    ///
    /// Creates the index with the declared primary key when the engine
    /// reports it missing. A concurrent creator winning the race is not an
    /// error. The attribute sets are applied on every call.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        let uid = self.config.index_name.as_str();
        let schema = &self.config.schema;

        match self.provider.get_index(uid).await {
            Ok(Some(_)) => {
                info!("Index `{}` already exists", uid);
            }
            Ok(None) => match self.provider.create_index(uid, &schema.primary_key).await {
                Ok(()) => info!(primary_key = %schema.primary_key, "Index `{}` created", uid),
                Err(SearchIndexError::IndexAlreadyExists(_)) => {
                    debug!("Index `{}` was created concurrently", uid);
                }
                Err(e) => {
                    error!(error = %e, "Failed to create index");
                    return Err(SearchError::IndexProvisioningError(e));
                }
            },
            Err(e) => {
                error!(error = %e, "Unexpected error when getting index");
                return Err(SearchError::IndexProvisioningError(e));
            }
        }

        self.provider
            .update_filterable_attributes(uid, &schema.filterable_attributes)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to update filterable attributes");
                SearchError::IndexProvisioningError(e)
            })?;
        debug!(attributes = ?schema.filterable_attributes, "Updated filterable attributes");

        self.provider
            .update_sortable_attributes(uid, &schema.sortable_attributes)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to update sortable attributes");
                SearchError::IndexProvisioningError(e)
            })?;
        debug!(attributes = ?schema.sortable_attributes, "Updated sortable attributes");

        Ok(())
    }

    /// Upsert a batch of documents keyed by identifier.
    ///
    /// The batch is consumed; an empty batch is a no-op.
    pub async fn upsert_batch(&self, documents: Vec<CatalogItem>) -> Result<(), SearchError> {
        self.upsert_documents(&documents).await
    }

    /// Upsert documents without taking ownership, so a failed write can be
    /// repeated with the same batch.
    #[instrument(skip(self, documents), fields(index = %self.config.index_name, count = documents.len()))]
    pub async fn upsert_documents(&self, documents: &[CatalogItem]) -> Result<(), SearchError> {
        if documents.is_empty() {
            debug!("Empty batch, nothing to upsert");
            return Ok(());
        }

        self.provider
            .add_documents(
                &self.config.index_name,
                &self.config.schema.primary_key,
                documents,
            )
            .await
            .map_err(SearchError::IndexWriteError)?;

        debug!(count = documents.len(), "Upserted documents");
        Ok(())
    }

    /// Delete every document, keeping the index and its schema.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn clear_all(&self) -> Result<(), SearchError> {
        self.provider
            .delete_all_documents(&self.config.index_name)
            .await
            .map_err(SearchError::IndexWriteError)?;

        info!("Index `{}` cleared", self.config.index_name);
        Ok(())
    }

    /// Delete the index together with its schema.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn drop_index(&self) -> Result<(), SearchError> {
        self.provider
            .delete_index(&self.config.index_name)
            .await
            .map_err(SearchError::IndexAdminError)?;

        info!("Index `{}` deleted", self.config.index_name);
        Ok(())
    }

    /// Drop the index if it exists; a missing index is not an error.
    pub async fn discard(&self) -> Result<(), SearchError> {
        match self.provider.delete_index(&self.config.index_name).await {
            Ok(()) | Err(SearchIndexError::IndexNotFound(_)) => Ok(()),
            Err(e) => Err(SearchError::IndexAdminError(e)),
        }
    }

    /// Replace the live index with the contents of `staging`.
    ///
    /// The two indexes are swapped, then the former live contents (now under
    /// the staging uid) are dropped.
    #[instrument(skip(self, staging), fields(index = %self.config.index_name, staging = %staging.index_name()))]
    pub async fn promote(&self, staging: &IndexManager) -> Result<(), SearchError> {
        self.provider
            .swap_indexes(&self.config.index_name, staging.index_name())
            .await
            .map_err(SearchError::IndexAdminError)?;

        info!("Staging index promoted to `{}`", self.config.index_name);

        if let Err(e) = staging.discard().await {
            warn!(error = %e, "Failed to drop previous index contents after swap");
        }
        Ok(())
    }

    /// Run a free-text query and return the ids of the hits.
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        if query.query.trim().is_empty() {
            return Err(SearchError::invalid_query("query text is empty"));
        }

        let primary_key = self.config.schema.primary_key.as_str();
        let request = build_search_request(query, primary_key);

        let hits = self
            .provider
            .search(&self.config.index_name, &request)
            .await
            .map_err(SearchError::QueryError)?;

        let ids = hits
            .hits
            .iter()
            .filter_map(|hit| hit.get(primary_key).and_then(|id| id.as_str()))
            .map(str::to_string)
            .collect();

        Ok(SearchResponse { ids })
    }

    /// Check if the search engine is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        self.provider
            .health_check()
            .await
            .map_err(SearchError::QueryError)
    }
}
