//! In-memory implementation of `SearchIndexProvider`.
//!
//! Keeps indexes in a map guarded by a mutex and records every write, so
//! tests in this and dependent crates can assert on what reached the engine.
//! Failures can be scripted per operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{IndexInfo, SearchHits, SearchRequest};
use media_indexer_shared::CatalogItem;

/// State of one in-memory index.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    pub primary_key: String,
    pub filterable_attributes: Vec<String>,
    pub sortable_attributes: Vec<String>,
    pub documents: BTreeMap<String, CatalogItem>,
}

/// Operations whose failures can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    GetIndex,
    CreateIndex,
    UpdateSettings,
    AddDocuments,
    DeleteAllDocuments,
    DeleteIndex,
    SwapIndexes,
    Search,
}

#[derive(Default)]
struct Inner {
    indexes: HashMap<String, MemoryIndex>,
    /// `(index uid, batch size)` for every successful `add_documents` call.
    add_calls: Vec<(String, usize)>,
    create_calls: usize,
    settings_calls: usize,
    failures: HashMap<MemoryOp, VecDeque<SearchIndexError>>,
}

/// A search engine living entirely in process memory.
#[derive(Default)]
pub struct InMemorySearchIndex {
    inner: Mutex<Inner>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `error`. Calls queue up.
    pub fn fail_next(&self, op: MemoryOp, error: SearchIndexError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    /// Snapshot of an index, if it exists.
    pub fn index(&self, uid: &str) -> Option<MemoryIndex> {
        self.lock().indexes.get(uid).cloned()
    }

    /// Documents of an index in primary-key order; empty when missing.
    pub fn documents(&self, uid: &str) -> Vec<CatalogItem> {
        self.lock()
            .indexes
            .get(uid)
            .map(|index| index.documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// `(index uid, batch size)` of every successful document write.
    pub fn add_calls(&self) -> Vec<(String, usize)> {
        self.lock().add_calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn settings_calls(&self) -> usize {
        self.lock().settings_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(inner: &mut Inner, op: MemoryOp) -> Result<(), SearchIndexError> {
        match inner.failures.get_mut(&op).and_then(|queue| queue.pop_front()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn index_mut<'a>(
        inner: &'a mut Inner,
        uid: &str,
    ) -> Result<&'a mut MemoryIndex, SearchIndexError> {
        inner
            .indexes
            .get_mut(uid)
            .ok_or_else(|| SearchIndexError::IndexNotFound(uid.to_string()))
    }
}

/// Evaluate the subset of filter syntax produced by `build_type_filter`.
fn matches_filter(document: &CatalogItem, filter: &str) -> bool {
    filter.split(" OR ").any(|clause| {
        let value = clause
            .trim()
            .strip_prefix("Type = '")
            .and_then(|rest| rest.strip_suffix('\''));
        value == Some(document.item_type.as_str())
    })
}

fn matches_text(document: &CatalogItem, query: &str) -> bool {
    let needle = query.to_lowercase();
    document
        .name
        .as_deref()
        .map(|name| name.to_lowercase().contains(&needle))
        .unwrap_or(false)
}

#[async_trait]
impl SearchIndexProvider for InMemorySearchIndex {
    async fn get_index(&self, uid: &str) -> Result<Option<IndexInfo>, SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::GetIndex)?;
        Ok(inner.indexes.get(uid).map(|index| IndexInfo {
            uid: uid.to_string(),
            primary_key: Some(index.primary_key.clone()),
        }))
    }

    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::CreateIndex)?;
        if inner.indexes.contains_key(uid) {
            return Err(SearchIndexError::IndexAlreadyExists(uid.to_string()));
        }
        inner.create_calls += 1;
        inner.indexes.insert(
            uid.to_string(),
            MemoryIndex {
                primary_key: primary_key.to_string(),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn update_filterable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::UpdateSettings)?;
        inner.settings_calls += 1;
        Self::index_mut(&mut inner, uid)?.filterable_attributes = attributes.to_vec();
        Ok(())
    }

    async fn update_sortable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::UpdateSettings)?;
        inner.settings_calls += 1;
        Self::index_mut(&mut inner, uid)?.sortable_attributes = attributes.to_vec();
        Ok(())
    }

    async fn add_documents(
        &self,
        uid: &str,
        _primary_key: &str,
        documents: &[CatalogItem],
    ) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::AddDocuments)?;
        let index = Self::index_mut(&mut inner, uid)?;
        for document in documents {
            index.documents.insert(document.id.clone(), document.clone());
        }
        inner.add_calls.push((uid.to_string(), documents.len()));
        Ok(())
    }

    async fn delete_all_documents(&self, uid: &str) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::DeleteAllDocuments)?;
        Self::index_mut(&mut inner, uid)?.documents.clear();
        Ok(())
    }

    async fn delete_index(&self, uid: &str) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::DeleteIndex)?;
        inner
            .indexes
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| SearchIndexError::IndexNotFound(uid.to_string()))
    }

    async fn swap_indexes(&self, first: &str, second: &str) -> Result<(), SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::SwapIndexes)?;
        let a = inner
            .indexes
            .remove(first)
            .ok_or_else(|| SearchIndexError::IndexNotFound(first.to_string()))?;
        let b = match inner.indexes.remove(second) {
            Some(b) => b,
            None => {
                inner.indexes.insert(first.to_string(), a);
                return Err(SearchIndexError::IndexNotFound(second.to_string()));
            }
        };
        inner.indexes.insert(first.to_string(), b);
        inner.indexes.insert(second.to_string(), a);
        Ok(())
    }

    async fn search(
        &self,
        uid: &str,
        request: &SearchRequest,
    ) -> Result<SearchHits, SearchIndexError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner, MemoryOp::Search)?;
        let index = Self::index_mut(&mut inner, uid)?;

        let matching: Vec<&CatalogItem> = index
            .documents
            .values()
            .filter(|doc| matches_text(doc, &request.q))
            .filter(|doc| {
                request
                    .filter
                    .as_deref()
                    .map(|filter| matches_filter(doc, filter))
                    .unwrap_or(true)
            })
            .collect();

        let total = matching.len() as u64;
        let hits = matching
            .into_iter()
            .skip(request.offset.unwrap_or(0))
            .take(request.limit.unwrap_or(20))
            .map(|doc| serde_json::to_value(doc).map_err(|e| SearchIndexError::serialization(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchHits {
            hits,
            estimated_total_hits: Some(total),
        })
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}
