//! Test doubles shared by the service's unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use media_indexer_pipeline::source::{
    CatalogSource, ItemsPage, ItemsQuery, RawCatalogRecord, SourceError,
};
use media_indexer_pipeline::{BatchFetcher, Orchestrator};
use media_indexer_repository::memory::InMemorySearchIndex;
use media_indexer_repository::IndexManager;
use media_indexer_shared::ContentType;

/// Serves a fixed catalog, paging through it like the real listing.
#[derive(Default)]
pub(crate) struct StaticSource {
    records: HashMap<ContentType, Vec<RawCatalogRecord>>,
}

impl StaticSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add one named record per entry of `names`.
    pub(crate) fn with_named(mut self, content_type: ContentType, names: &[&str]) -> Self {
        let records = self.records.entry(content_type).or_default();
        for name in names {
            let id = format!("{}-{}", content_type.as_str().to_lowercase(), records.len());
            let mut record = RawCatalogRecord::new(id, content_type.as_str());
            record.name = Some(name.to_string());
            records.push(record);
        }
        self
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn list_items(&self, query: &ItemsQuery) -> Result<ItemsPage, SourceError> {
        let all = self
            .records
            .get(&query.content_type)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(ItemsPage {
            items: all
                .iter()
                .skip(query.start_index as usize)
                .take(query.limit)
                .cloned()
                .collect(),
            total_record_count: all.len() as u64,
        })
    }
}

/// An orchestrator over `source` writing into a fresh in-memory engine.
pub(crate) fn orchestrator(source: StaticSource) -> (Arc<InMemorySearchIndex>, Arc<Orchestrator>) {
    let engine = Arc::new(InMemorySearchIndex::new());
    let orchestrator = Orchestrator::new(
        BatchFetcher::new(Arc::new(source)),
        IndexManager::new(engine.clone()),
    );
    (engine, Arc::new(orchestrator))
}
