//! Fetcher module for the media indexer pipeline.
//!
//! Discovers how many items of a content type exist and retrieves them in
//! fixed-size pages.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use crate::source::{CatalogSource, ItemsPage, ItemsQuery, RawCatalogRecord, SourceError};
use media_indexer_shared::ContentType;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Number of pages needed to cover `total` items.
pub fn batch_count(total: u64, page_size: usize) -> u64 {
    let page_size = page_size.max(1) as u64;
    total.div_ceil(page_size)
}

/// Pages through the catalog source one content type at a time.
///
/// Transient source failures are retried per request; anything else, or a
/// transient failure that outlives the retry policy, surfaces as
/// `PipelineError::SourceUnavailable` for the content type.
#[derive(Clone)]
pub struct BatchFetcher {
    source: Arc<dyn CatalogSource>,
    page_size: usize,
    retry: RetryPolicy,
}

impl BatchFetcher {
    /// Create a fetcher with the default page size and no retries.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_config(source, DEFAULT_PAGE_SIZE, RetryPolicy::none())
    }

    /// Create a fetcher with a custom page size and retry policy. A page
    /// size of zero is treated as one.
    pub fn with_config(source: Arc<dyn CatalogSource>, page_size: usize, retry: RetryPolicy) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            retry,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Learn the total number of items of `content_type` with a one-item
    /// request.
    #[instrument(skip(self))]
    pub async fn probe_total(&self, content_type: ContentType) -> Result<u64, PipelineError> {
        let query = ItemsQuery::probe(content_type);
        let page = self.list(&query).await?;

        debug!(total = page.total_record_count, "Probed total item count");
        Ok(page.total_record_count)
    }

    /// Fetch up to `page_size` records of `content_type` starting at
    /// `offset`.
    #[instrument(skip(self))]
    pub async fn fetch_page(
        &self,
        content_type: ContentType,
        offset: u64,
        page_size: usize,
    ) -> Result<Vec<RawCatalogRecord>, PipelineError> {
        let query = ItemsQuery::page(content_type, offset, page_size);
        let page = self.list(&query).await?;
        Ok(page.items)
    }

    async fn list(&self, query: &ItemsQuery) -> Result<ItemsPage, PipelineError> {
        let source = &self.source;
        self.retry
            .run("list_items", SourceError::is_transient, move || async move {
                source.list_items(query).await
            })
            .await
            .map_err(|e| PipelineError::source_unavailable(query.content_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::source::testing::ScriptedSource;

    #[test]
    fn test_batch_count_rounds_up() {
        assert_eq!(batch_count(0, 1000), 0);
        assert_eq!(batch_count(1, 1000), 1);
        assert_eq!(batch_count(1000, 1000), 1);
        assert_eq!(batch_count(2500, 1000), 3);
        assert_eq!(batch_count(5, 0), 5);
    }

    #[tokio::test]
    async fn test_probe_uses_single_item_request() {
        let source = Arc::new(ScriptedSource::new().with_items(ContentType::Movie, 2500));
        let fetcher = BatchFetcher::new(source.clone());

        let total = fetcher.probe_total(ContentType::Movie).await.unwrap();

        assert_eq!(total, 2500);
        assert_eq!(source.requests(), vec![ItemsQuery::probe(ContentType::Movie)]);
    }

    #[tokio::test]
    async fn test_fetch_page_returns_requested_slice() {
        let source = Arc::new(ScriptedSource::new().with_items(ContentType::Audio, 25));
        let fetcher = BatchFetcher::with_config(source, 10, RetryPolicy::none());

        let page = fetcher.fetch_page(ContentType::Audio, 20, 10).await.unwrap();

        assert_eq!(page.len(), 5);
        assert_eq!(page[0].id.as_deref(), Some("audio-00020"));
    }

    #[tokio::test]
    async fn test_permanent_failure_names_content_type() {
        let source = Arc::new(ScriptedSource::new());
        source.fail_at(
            ContentType::Episode,
            0,
            SourceError::HttpError {
                status: 401,
                message: "unauthorized".to_string(),
            },
        );
        let fetcher = BatchFetcher::with_config(
            source.clone(),
            10,
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        );

        let err = fetcher
            .fetch_page(ContentType::Episode, 0, 10)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SourceUnavailable {
                content_type: ContentType::Episode,
                ..
            }
        ));
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let source = Arc::new(ScriptedSource::new().with_items(ContentType::Series, 3));
        source.fail_at(ContentType::Series, 0, SourceError::timeout("30s elapsed"));
        let fetcher = BatchFetcher::with_config(
            source.clone(),
            10,
            RetryPolicy {
                max_attempts: 2,
                initial_delay: Duration::from_millis(50),
                max_delay: Duration::from_millis(50),
            },
        );

        let page = fetcher.fetch_page(ContentType::Series, 0, 10).await.unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(source.requests().len(), 2);
    }
}
