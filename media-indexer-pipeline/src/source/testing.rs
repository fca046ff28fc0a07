//! Scripted `CatalogSource` used by the pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use media_indexer_shared::ContentType;

use super::{CatalogSource, ItemsPage, ItemsQuery, RawCatalogRecord, SourceError};

/// Serves per-type record lists with real paging semantics and records
/// every request it receives.
#[derive(Default)]
pub struct ScriptedSource {
    catalog: Mutex<HashMap<ContentType, Vec<RawCatalogRecord>>>,
    /// Overrides the reported total, e.g. to simulate a shrinking catalog.
    reported_totals: Mutex<HashMap<ContentType, u64>>,
    failures: Mutex<HashMap<ContentType, VecDeque<(u64, SourceError)>>>,
    requests: Mutex<Vec<ItemsQuery>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `count` well-formed records of `content_type`.
    pub fn with_items(self, content_type: ContentType, count: usize) -> Self {
        let records = (0..count)
            .map(|i| {
                let mut record = RawCatalogRecord::new(
                    format!("{}-{:05}", content_type.as_str().to_lowercase(), i),
                    content_type.as_str(),
                );
                record.name = Some(format!("{} {}", content_type, i));
                record
            })
            .collect();
        self.with_records(content_type, records)
    }

    /// Serve exactly these records for `content_type`.
    pub fn with_records(self, content_type: ContentType, records: Vec<RawCatalogRecord>) -> Self {
        self.catalog.lock().unwrap().insert(content_type, records);
        self
    }

    /// Report `total` for `content_type` regardless of the served records.
    pub fn with_reported_total(self, content_type: ContentType, total: u64) -> Self {
        self.reported_totals.lock().unwrap().insert(content_type, total);
        self
    }

    /// Fail the next request for `content_type` starting at `start_index`.
    /// Use `u64::MAX` to fail the next request regardless of offset.
    pub fn fail_at(&self, content_type: ContentType, start_index: u64, error: SourceError) {
        self.failures
            .lock()
            .unwrap()
            .entry(content_type)
            .or_default()
            .push_back((start_index, error));
    }

    pub fn requests(&self) -> Vec<ItemsQuery> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, content_type: ContentType) -> Vec<ItemsQuery> {
        self.requests()
            .into_iter()
            .filter(|q| q.content_type == content_type)
            .collect()
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn list_items(&self, query: &ItemsQuery) -> Result<ItemsPage, SourceError> {
        self.requests.lock().unwrap().push(query.clone());

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(queue) = failures.get_mut(&query.content_type) {
                let due = queue
                    .front()
                    .map(|(at, _)| *at == u64::MAX || *at == query.start_index)
                    .unwrap_or(false);
                if due {
                    if let Some((_, error)) = queue.pop_front() {
                        return Err(error);
                    }
                }
            }
        }

        let catalog = self.catalog.lock().unwrap();
        let records = catalog.get(&query.content_type).cloned().unwrap_or_default();
        let total = self
            .reported_totals
            .lock()
            .unwrap()
            .get(&query.content_type)
            .copied()
            .unwrap_or(records.len() as u64);

        let items = records
            .into_iter()
            .skip(query.start_index as usize)
            .take(query.limit)
            .collect();

        Ok(ItemsPage {
            items,
            total_record_count: total,
        })
    }
}
