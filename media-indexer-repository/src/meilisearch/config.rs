//! Connection settings for the Meilisearch client.

use std::time::Duration;

/// Default Meilisearch URL.
pub const DEFAULT_MEILISEARCH_URL: &str = "http://localhost:7700";

/// Connection and task-polling settings.
#[derive(Debug, Clone)]
pub struct MeilisearchConfig {
    /// Base URL of the Meilisearch server.
    pub url: String,
    /// API key sent as a bearer token, if the server requires one.
    pub api_key: Option<String>,
    /// Timeout of a single HTTP request.
    pub request_timeout: Duration,
    /// Delay between two polls of a pending task.
    pub task_poll_interval: Duration,
    /// Maximum time to wait for a task to reach a terminal state.
    pub task_timeout: Duration,
}

impl Default for MeilisearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MEILISEARCH_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            task_poll_interval: Duration::from_millis(100),
            task_timeout: Duration::from_secs(120),
        }
    }
}

impl MeilisearchConfig {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            ..Default::default()
        }
    }

    pub fn with_task_timeout(mut self, task_timeout: Duration) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    pub fn with_task_poll_interval(mut self, task_poll_interval: Duration) -> Self {
        self.task_poll_interval = task_poll_interval;
        self
    }
}
