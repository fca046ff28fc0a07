//! Service settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use media_indexer_pipeline::{RetryPolicy, SyncMode};
use media_indexer_repository::config::DEFAULT_INDEX_NAME;
use media_indexer_repository::meilisearch::{MeilisearchConfig, DEFAULT_MEILISEARCH_URL};

use crate::telemetry::LogFormat;
use crate::IndexingError;

/// Default page size of the source listing.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default period of the scheduled sync, in minutes.
const DEFAULT_SCRAPE_INTERVAL_MINUTES: u64 = 60;

/// Default gateway port.
const DEFAULT_PORT: u16 = 5000;

/// Default timeout of a source request, in seconds.
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

/// Everything the service needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub jellyfin_url: String,
    pub jellyfin_api_key: String,
    pub meilisearch_url: String,
    pub meilisearch_api_key: Option<String>,
    /// How long a write waits for its engine task before giving up.
    pub meilisearch_task_timeout: Duration,
    pub meilisearch_task_poll_interval: Duration,
    pub index_name: String,
    /// Token expected in the `Authorization` header of admin routes. Admin
    /// routes are closed when unset.
    pub gateway_auth_token: Option<String>,
    pub batch_size: usize,
    /// Period of the scheduled sync; `None` disables the scheduler.
    pub scrape_interval: Option<Duration>,
    pub port: u16,
    pub source_timeout: Duration,
    pub retry: RetryPolicy,
    pub sync_mode: SyncMode,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `JELLYFIN_URL`: Jellyfin server URL (required)
    /// - `JELLYFIN_API_KEY`: Jellyfin API key (required)
    /// - `MEILISEARCH_URL`: Meilisearch URL (default: http://localhost:7700)
    /// - `MEILISEARCH_API_KEY`: Meilisearch key (optional)
    /// - `MEILISEARCH_TASK_TIMEOUT_SECS`: wait for an indexing task (default: 120)
    /// - `MEILISEARCH_TASK_POLL_INTERVAL_MS`: task polling period (default: 100)
    /// - `INDEX_NAME`: index uid (default: jellyfin_items)
    /// - `GATEWAY_AUTH_TOKEN`: token for admin routes (optional)
    /// - `BATCH_SIZE`: page size, greater than zero (default: 1000)
    /// - `SCRAPE_INTERVAL_MINUTES`: scheduler period, 0 disables (default: 60)
    /// - `PORT`: gateway port (default: 5000)
    /// - `SOURCE_TIMEOUT_SECS`: Jellyfin request timeout (default: 30)
    /// - `RETRY_MAX_ATTEMPTS`, `RETRY_INITIAL_DELAY_MS`, `RETRY_MAX_DELAY_MS`:
    ///   backoff for transient failures (default: 3, 500, 10000)
    /// - `SYNC_MODE`: `incremental` or `atomic` (default: incremental)
    /// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IndexingError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| IndexingError::config(format!("{} must be set", key)))
        };

        let batch_size: usize = parse_or(&get, "BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(IndexingError::config("BATCH_SIZE must be greater than zero"));
        }

        let interval_minutes: u64 =
            parse_or(&get, "SCRAPE_INTERVAL_MINUTES", DEFAULT_SCRAPE_INTERVAL_MINUTES)?;
        let defaults = RetryPolicy::default();
        let engine_defaults = MeilisearchConfig::default();

        let meilisearch_task_timeout = Duration::from_secs(parse_or(
            &get,
            "MEILISEARCH_TASK_TIMEOUT_SECS",
            engine_defaults.task_timeout.as_secs(),
        )?);
        if meilisearch_task_timeout.is_zero() {
            return Err(IndexingError::config(
                "MEILISEARCH_TASK_TIMEOUT_SECS must be greater than zero",
            ));
        }

        Ok(Self {
            jellyfin_url: required("JELLYFIN_URL")?,
            jellyfin_api_key: required("JELLYFIN_API_KEY")?,
            meilisearch_url: get("MEILISEARCH_URL")
                .unwrap_or_else(|| DEFAULT_MEILISEARCH_URL.to_string()),
            meilisearch_api_key: get("MEILISEARCH_API_KEY"),
            meilisearch_task_timeout,
            meilisearch_task_poll_interval: Duration::from_millis(parse_or(
                &get,
                "MEILISEARCH_TASK_POLL_INTERVAL_MS",
                engine_defaults.task_poll_interval.as_millis() as u64,
            )?),
            index_name: get("INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            gateway_auth_token: get("GATEWAY_AUTH_TOKEN"),
            batch_size,
            scrape_interval: (interval_minutes > 0)
                .then(|| Duration::from_secs(interval_minutes * 60)),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            source_timeout: Duration::from_secs(parse_or(
                &get,
                "SOURCE_TIMEOUT_SECS",
                DEFAULT_SOURCE_TIMEOUT_SECS,
            )?),
            retry: RetryPolicy {
                max_attempts: parse_or(&get, "RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
                initial_delay: Duration::from_millis(parse_or(
                    &get,
                    "RETRY_INITIAL_DELAY_MS",
                    defaults.initial_delay.as_millis() as u64,
                )?),
                max_delay: Duration::from_millis(parse_or(
                    &get,
                    "RETRY_MAX_DELAY_MS",
                    defaults.max_delay.as_millis() as u64,
                )?),
            },
            sync_mode: parse_or(&get, "SYNC_MODE", SyncMode::default())?,
            log_format: parse_or(&get, "LOG_FORMAT", LogFormat::default())?,
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {} `{}`: {}", key, raw, e))),
        None => Ok(default),
    }
}
