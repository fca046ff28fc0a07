//! Meilisearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! over the Meilisearch REST API. Writes are enqueued by the engine as tasks;
//! the client polls each task until it reaches a terminal state so callers
//! observe the final outcome of the write.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::meilisearch::config::MeilisearchConfig;
use crate::meilisearch::tasks::{api_error, EnqueuedTask, Task};
use crate::types::{IndexInfo, SearchHits, SearchRequest};
use media_indexer_shared::CatalogItem;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Meilisearch client implementing `SearchIndexProvider`.
#[derive(Clone)]
pub struct MeilisearchClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    task_poll_interval: Duration,
    task_timeout: Duration,
}

impl MeilisearchClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: MeilisearchConfig) -> Result<Self, SearchIndexError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| SearchIndexError::connection(format!("Invalid URL {}: {}", config.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchIndexError::connection(format!(
                "Invalid URL {}: not a base URL",
                config.url
            )));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchIndexError::connection(format!("Failed to create client: {}", e)))?;

        info!(url = %base_url, "Created Meilisearch client");

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            task_poll_interval: config.task_poll_interval,
            task_timeout: config.task_timeout,
        })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchIndexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchIndexError::connection("URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send a request and turn non-success answers into errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, SearchIndexError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }

    /// Send a write request and wait for the task it enqueued.
    async fn send_task(&self, builder: RequestBuilder) -> Result<(), SearchIndexError> {
        let enqueued: EnqueuedTask = self.send(builder).await?.json().await?;
        self.wait_for_task(enqueued.task_uid).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn wait_for_task(&self, task_uid: u64) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["tasks", &task_uid.to_string()])?;
        let deadline = Instant::now() + self.task_timeout;

        loop {
            let task: Task = self
                .send(self.request(Method::GET, url.clone()))
                .await?
                .json()
                .await?;

            if task.is_terminal() {
                debug!(task_uid, status = ?task.status, "Task finished");
                return task.into_result();
            }

            if Instant::now() >= deadline {
                warn!(task_uid, "Gave up waiting for task");
                return Err(SearchIndexError::TaskTimeout { task_uid });
            }

            tokio::time::sleep(self.task_poll_interval).await;
        }
    }
}

#[async_trait]
impl SearchIndexProvider for MeilisearchClient {
    #[instrument(skip(self))]
    async fn get_index(&self, uid: &str) -> Result<Option<IndexInfo>, SearchIndexError> {
        let url = self.endpoint(&["indexes", uid])?;
        match self.send(self.request(Method::GET, url)).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(SearchIndexError::IndexNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["indexes"])?;
        let body = json!({ "uid": uid, "primaryKey": primary_key });
        self.send_task(self.request(Method::POST, url).json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn update_filterable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["indexes", uid, "settings", "filterable-attributes"])?;
        self.send_task(self.request(Method::PUT, url).json(attributes))
            .await
    }

    #[instrument(skip(self))]
    async fn update_sortable_attributes(
        &self,
        uid: &str,
        attributes: &[String],
    ) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["indexes", uid, "settings", "sortable-attributes"])?;
        self.send_task(self.request(Method::PUT, url).json(attributes))
            .await
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(
        &self,
        uid: &str,
        primary_key: &str,
        documents: &[CatalogItem],
    ) -> Result<(), SearchIndexError> {
        let mut url = self.endpoint(&["indexes", uid, "documents"])?;
        url.query_pairs_mut().append_pair("primaryKey", primary_key);

        let body = serde_json::to_vec(documents)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        self.send_task(
            self.request(Method::POST, url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_all_documents(&self, uid: &str) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["indexes", uid, "documents"])?;
        self.send_task(self.request(Method::DELETE, url)).await
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, uid: &str) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["indexes", uid])?;
        self.send_task(self.request(Method::DELETE, url)).await
    }

    #[instrument(skip(self))]
    async fn swap_indexes(&self, first: &str, second: &str) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["swap-indexes"])?;
        let body = json!([{ "indexes": [first, second] }]);
        self.send_task(self.request(Method::POST, url).json(&body))
            .await
    }

    #[instrument(skip(self, request), fields(q = %request.q))]
    async fn search(
        &self,
        uid: &str,
        request: &SearchRequest,
    ) -> Result<SearchHits, SearchIndexError> {
        let url = self.endpoint(&["indexes", uid, "search"])?;
        let hits: SearchHits = self
            .send(self.request(Method::POST, url).json(request))
            .await?
            .json()
            .await?;
        debug!(hits = hits.hits.len(), "Search completed");
        Ok(hits)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let url = self.endpoint(&["health"])?;
        let health: HealthResponse = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await?;
        Ok(health.status == "available")
    }
}
