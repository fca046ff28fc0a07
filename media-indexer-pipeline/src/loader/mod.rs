//! Loader module for the media indexer pipeline.
//!
//! Flushes the documents of one content type into the search index.

use tracing::{error, info, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use media_indexer_repository::{IndexManager, SearchError};
use media_indexer_shared::{CatalogItem, ContentType};

/// Loader that writes a content type's documents to the index.
///
/// The loader is responsible for:
/// - Writing a whole content type in a single upsert
/// - Retrying transient write failures with backoff
pub struct CatalogLoader {
    index: IndexManager,
    retry: RetryPolicy,
}

impl CatalogLoader {
    /// Create a loader that does not retry.
    pub fn new(index: IndexManager) -> Self {
        Self::with_retry(index, RetryPolicy::none())
    }

    /// Create a loader with a custom retry policy.
    pub fn with_retry(index: IndexManager, retry: RetryPolicy) -> Self {
        Self { index, retry }
    }

    /// Index the loader writes to.
    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    /// Write `documents` in one batch and return how many were written.
    ///
    /// The buffer is consumed; an empty buffer writes nothing.
    #[instrument(skip(self, documents), fields(index = %self.index.index_name(), count = documents.len()))]
    pub async fn flush(
        &self,
        content_type: ContentType,
        documents: Vec<CatalogItem>,
    ) -> Result<usize, PipelineError> {
        let count = documents.len();
        if count == 0 {
            info!(content_type = %content_type, "No documents to flush");
            return Ok(0);
        }

        let index = &self.index;
        let batch = documents.as_slice();
        self.retry
            .run("upsert_batch", SearchError::is_retryable, move || async move {
                index.upsert_documents(batch).await
            })
            .await
            .map_err(|e| {
                error!(content_type = %content_type, error = %e, count, "Failed to flush documents");
                PipelineError::from(e)
            })?;

        info!(content_type = %content_type, count, "Flushed documents to search index");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use media_indexer_repository::memory::{InMemorySearchIndex, MemoryOp};
    use media_indexer_repository::SearchIndexError;

    async fn loader_with(engine: Arc<InMemorySearchIndex>, retry: RetryPolicy) -> CatalogLoader {
        let index = IndexManager::new(engine);
        index.ensure_index().await.unwrap();
        CatalogLoader::with_retry(index, retry)
    }

    fn movies(count: usize) -> Vec<CatalogItem> {
        (0..count)
            .map(|i| CatalogItem::new(format!("m{}", i), ContentType::Movie))
            .collect()
    }

    #[tokio::test]
    async fn test_flush_writes_single_batch() {
        let engine = Arc::new(InMemorySearchIndex::new());
        let loader = loader_with(engine.clone(), RetryPolicy::none()).await;

        let written = loader.flush(ContentType::Movie, movies(2500)).await.unwrap();

        assert_eq!(written, 2500);
        assert_eq!(engine.add_calls(), vec![("jellyfin_items".to_string(), 2500)]);
    }

    #[tokio::test]
    async fn test_empty_flush_skips_engine() {
        let engine = Arc::new(InMemorySearchIndex::new());
        let loader = loader_with(engine.clone(), RetryPolicy::none()).await;

        let written = loader.flush(ContentType::Audio, Vec::new()).await.unwrap();

        assert_eq!(written, 0);
        assert!(engine.add_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_write_failure_is_retried() {
        let engine = Arc::new(InMemorySearchIndex::new());
        let loader = loader_with(
            engine.clone(),
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(10),
            },
        )
        .await;
        engine.fail_next(MemoryOp::AddDocuments, SearchIndexError::timeout("30s elapsed"));

        let written = loader.flush(ContentType::Movie, movies(3)).await.unwrap();

        assert_eq!(written, 3);
        assert_eq!(engine.documents("jellyfin_items").len(), 3);
    }

    #[tokio::test]
    async fn test_validation_failure_is_not_retried() {
        let engine = Arc::new(InMemorySearchIndex::new());
        let loader = loader_with(
            engine.clone(),
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        )
        .await;
        engine.fail_next(
            MemoryOp::AddDocuments,
            SearchIndexError::TaskFailed {
                task_uid: 3,
                code: Some("invalid_document_id".to_string()),
                message: "bad id".to_string(),
            },
        );
        engine.fail_next(MemoryOp::AddDocuments, SearchIndexError::timeout("unused"));

        let err = loader.flush(ContentType::Movie, movies(3)).await.unwrap_err();

        assert!(matches!(err, PipelineError::IndexWrite(_)));
        assert!(engine.add_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_timeout_does_not_resend_batch() {
        let engine = Arc::new(InMemorySearchIndex::new());
        let loader = loader_with(
            engine.clone(),
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(10),
            },
        )
        .await;
        engine.fail_next(MemoryOp::AddDocuments, SearchIndexError::TaskTimeout { task_uid: 42 });

        let err = loader.flush(ContentType::Episode, movies(3)).await.unwrap_err();

        assert!(matches!(err, PipelineError::IndexWrite(_)));
        assert!(engine.add_calls().is_empty());
        assert!(engine.documents("jellyfin_items").is_empty());
    }
}
