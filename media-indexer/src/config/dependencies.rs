//! Dependency initialization and wiring for the media indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::IndexingError;
use media_indexer_pipeline::{
    BatchFetcher, CatalogSource, JellyfinClient, JellyfinConfig, Orchestrator, OrchestratorConfig,
};
use media_indexer_repository::{
    IndexManager, MeilisearchClient, MeilisearchConfig, SearchIndexConfig, SearchIndexProvider,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator, shared by the scheduler and the gateway.
    pub orchestrator: Arc<Orchestrator>,
}

impl Dependencies {
    /// Initialize all dependencies from `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a client cannot be built or Meilisearch is
    ///   not reachable
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            jellyfin_url = %settings.jellyfin_url,
            meilisearch_url = %settings.meilisearch_url,
            index_name = %settings.index_name,
            batch_size = settings.batch_size,
            mode = %settings.sync_mode,
            "Initializing dependencies"
        );

        // Initialize Jellyfin client
        let jellyfin = JellyfinClient::new(
            JellyfinConfig::new(&settings.jellyfin_url, &settings.jellyfin_api_key)
                .with_timeout(settings.source_timeout),
        )
        .map_err(|e| IndexingError::config(format!("Failed to create Jellyfin client: {}", e)))?;

        // Initialize Meilisearch client
        let meilisearch = MeilisearchClient::new(
            MeilisearchConfig::new(&settings.meilisearch_url, settings.meilisearch_api_key.clone())
                .with_task_timeout(settings.meilisearch_task_timeout)
                .with_task_poll_interval(settings.meilisearch_task_poll_interval),
        )
        .map_err(|e| IndexingError::config(format!("Failed to create Meilisearch client: {}", e)))?;

        // Verify Meilisearch is reachable
        let healthy = meilisearch
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("Meilisearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("Meilisearch is not available"));
        }

        info!("Meilisearch connection verified");

        Ok(Self::wire(Arc::new(jellyfin), Arc::new(meilisearch), settings))
    }

    /// Assemble the pipeline around already built clients.
    pub fn wire(
        source: Arc<dyn CatalogSource>,
        provider: Arc<dyn SearchIndexProvider>,
        settings: &Settings,
    ) -> Self {
        let index = IndexManager::with_config(
            provider,
            SearchIndexConfig::with_index_name(&settings.index_name),
        );
        let fetcher = BatchFetcher::with_config(source, settings.batch_size, settings.retry.clone());
        let orchestrator = Orchestrator::with_config(
            fetcher,
            index,
            OrchestratorConfig {
                mode: settings.sync_mode,
                write_retry: settings.retry.clone(),
            },
        );

        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use media_indexer_pipeline::SyncMode;
    use media_indexer_repository::memory::InMemorySearchIndex;
    use media_indexer_shared::ContentType;

    #[tokio::test]
    async fn test_wire_applies_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "JELLYFIN_URL" => Some("http://jellyfin:8096".to_string()),
            "JELLYFIN_API_KEY" => Some("secret".to_string()),
            "INDEX_NAME" => Some("media".to_string()),
            "BATCH_SIZE" => Some("1".to_string()),
            "SYNC_MODE" => Some("atomic".to_string()),
            _ => None,
        })
        .unwrap();
        let source = StaticSource::new().with_named(ContentType::Series, &["Dark", "Lost"]);
        let engine = Arc::new(InMemorySearchIndex::new());

        let deps = Dependencies::wire(Arc::new(source), engine.clone(), &settings);
        let report = deps.orchestrator.run().await;

        assert!(report.is_success(), "{}", report.message);
        assert_eq!(deps.orchestrator.mode(), SyncMode::Atomic);
        assert_eq!(deps.orchestrator.index().index_name(), "media");
        assert_eq!(report.progress(ContentType::Series).unwrap().batches, 2);
        assert_eq!(engine.documents("media").len(), 2);
    }
}
