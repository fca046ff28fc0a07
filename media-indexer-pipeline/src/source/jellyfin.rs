//! Jellyfin implementation of `CatalogSource`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::errors::SourceError;
use super::messages::{ItemsPage, ItemsQuery, SOURCE_FIELDS};
use super::CatalogSource;

/// Header carrying the Jellyfin API key.
const TOKEN_HEADER: &str = "X-Emby-Token";

/// Sort order sent with every listing so that repeated scans see items in
/// the same order and pages neither overlap nor skip items.
const SORT_BY: &str = "SortName,DateCreated";
const SORT_ORDER: &str = "Ascending";

/// Connection settings for the Jellyfin server.
#[derive(Debug, Clone)]
pub struct JellyfinConfig {
    /// Base URL of the server.
    pub url: String,
    /// API key sent in the `X-Emby-Token` header.
    pub api_key: String,
    /// Timeout of a single request.
    pub timeout: Duration,
}

impl JellyfinConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the Jellyfin `/Items` listing.
#[derive(Clone)]
pub struct JellyfinClient {
    http: Client,
    items_url: Url,
    api_key: String,
}

impl JellyfinClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: JellyfinConfig) -> Result<Self, SourceError> {
        let mut items_url = Url::parse(&config.url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        items_url
            .path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(format!("{}: not a base URL", config.url)))?
            .pop_if_empty()
            .push("Items");

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::connection(format!("Failed to create client: {}", e)))?;

        info!(url = %items_url, timeout_secs = config.timeout.as_secs(), "Created Jellyfin client");

        Ok(Self {
            http,
            items_url,
            api_key: config.api_key,
        })
    }

    fn items_url(&self, query: &ItemsQuery) -> Url {
        let mut url = self.items_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("Recursive", "true")
                .append_pair("IncludeItemTypes", query.content_type.as_str())
                .append_pair("StartIndex", &query.start_index.to_string())
                .append_pair("Limit", &query.limit.to_string())
                .append_pair("SortBy", SORT_BY)
                .append_pair("SortOrder", SORT_ORDER);
            if query.with_fields {
                pairs.append_pair("Fields", &SOURCE_FIELDS.join(","));
            }
        }
        url
    }
}

#[async_trait]
impl CatalogSource for JellyfinClient {
    #[instrument(skip(self), fields(content_type = %query.content_type, start = query.start_index, limit = query.limit))]
    async fn list_items(&self, query: &ItemsQuery) -> Result<ItemsPage, SourceError> {
        let response = self
            .http
            .get(self.items_url(query))
            .header(TOKEN_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let page: ItemsPage = response.json().await?;
        debug!(
            returned = page.items.len(),
            total = page.total_record_count,
            "Listed items"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use media_indexer_shared::ContentType;

    #[derive(Default)]
    struct Seen {
        params: Vec<HashMap<String, String>>,
        tokens: Vec<Option<String>>,
    }

    type Shared = Arc<Mutex<Seen>>;

    async fn items(
        State(seen): State<Shared>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        let mut seen = seen.lock().unwrap();
        seen.tokens.push(
            headers
                .get(TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
        );
        let item_type = params.get("IncludeItemTypes").cloned().unwrap_or_default();
        seen.params.push(params);

        if item_type == "Audio" {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("boom")));
        }

        (
            StatusCode::OK,
            Json(json!({
                "Items": [{ "Id": "m1", "Name": "Alien", "Type": item_type }],
                "TotalRecordCount": 42,
                "StartIndex": 0
            })),
        )
    }

    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Json(json!({ "Items": [], "TotalRecordCount": 0 }))
    }

    async fn spawn_fake(seen: Shared) -> String {
        let app = Router::new()
            .route("/jellyfin/Items", get(items))
            .route("/slow/Items", get(slow))
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = JellyfinClient::new(JellyfinConfig::new("::not a url::", "key"));
        assert!(matches!(result, Err(SourceError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_page_request_carries_paging_and_fields() {
        let seen = Shared::default();
        let base = spawn_fake(seen.clone()).await;
        let client = JellyfinClient::new(JellyfinConfig::new(format!("{}/jellyfin/", base), "secret")).unwrap();

        let page = client
            .list_items(&ItemsQuery::page(ContentType::Movie, 2000, 1000))
            .await
            .unwrap();

        assert_eq!(page.total_record_count, 42);
        assert_eq!(page.items[0].item_type.as_deref(), Some("Movie"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.tokens, vec![Some("secret".to_string())]);
        let params = &seen.params[0];
        assert_eq!(params["Recursive"], "true");
        assert_eq!(params["IncludeItemTypes"], "Movie");
        assert_eq!(params["StartIndex"], "2000");
        assert_eq!(params["Limit"], "1000");
        assert_eq!(params["SortBy"], SORT_BY);
        assert!(params["Fields"].split(',').any(|f| f == "RunTimeTicks"));
    }

    #[tokio::test]
    async fn test_probe_does_not_ask_for_fields() {
        let seen = Shared::default();
        let base = spawn_fake(seen.clone()).await;
        let client = JellyfinClient::new(JellyfinConfig::new(format!("{}/jellyfin", base), "secret")).unwrap();

        client
            .list_items(&ItemsQuery::probe(ContentType::Series))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.params[0]["Limit"], "1");
        assert!(!seen.params[0].contains_key("Fields"));
    }

    #[tokio::test]
    async fn test_server_error_is_transient_http_error() {
        let seen = Shared::default();
        let base = spawn_fake(seen).await;
        let client = JellyfinClient::new(JellyfinConfig::new(format!("{}/jellyfin", base), "secret")).unwrap();

        let err = client
            .list_items(&ItemsQuery::page(ContentType::Audio, 0, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::HttpError { status: 500, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let seen = Shared::default();
        let base = spawn_fake(seen).await;
        let config = JellyfinConfig::new(format!("{}/slow", base), "secret")
            .with_timeout(Duration::from_millis(100));
        let client = JellyfinClient::new(config).unwrap();

        let err = client
            .list_items(&ItemsQuery::probe(ContentType::Movie))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Timeout(_)));
    }
}
