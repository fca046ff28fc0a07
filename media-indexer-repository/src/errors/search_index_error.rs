//! Search index error types.
//!
//! This module defines the errors raised by a `SearchIndexProvider`, i.e. by
//! the transport and API layer of the search engine.

use thiserror::Error;

/// Errors that can occur while talking to the search engine.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within its timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The engine answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    ApiError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The requested index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// An index with the same uid already exists.
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    /// An asynchronous engine task ended in the `failed` state.
    #[error("Task {task_uid} failed: {message}")]
    TaskFailed {
        task_uid: u64,
        code: Option<String>,
        message: String,
    },

    /// An asynchronous engine task did not finish in time.
    #[error("Task {task_uid} did not complete in time")]
    TaskTimeout { task_uid: u64 },

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, timeouts, throttling and server-side errors are
    /// transient; validation failures and missing indexes are not.
    ///
    /// A task that outlived the wait is still enqueued on the engine, so
    /// sending the request again would only stack a duplicate task.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchIndexError::ConnectionError(_) | SearchIndexError::Timeout(_) => true,
            SearchIndexError::ApiError { status, .. } => *status == 429 || *status >= 500,
            SearchIndexError::IndexNotFound(_)
            | SearchIndexError::IndexAlreadyExists(_)
            | SearchIndexError::TaskTimeout { .. }
            | SearchIndexError::TaskFailed { .. }
            | SearchIndexError::SerializationError(_)
            | SearchIndexError::ParseError(_) => false,
        }
    }
}

impl From<reqwest::Error> for SearchIndexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}
