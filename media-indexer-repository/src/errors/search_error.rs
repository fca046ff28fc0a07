//! Search error types.
//!
//! This module defines the errors returned by the `IndexManager`. Each variant
//! names the lifecycle operation that failed and carries the underlying
//! provider error.

use thiserror::Error;

use super::SearchIndexError;

/// Errors that can occur during index lifecycle and document operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Creating the index or applying its schema failed.
    #[error("Index provisioning error: {0}")]
    IndexProvisioningError(SearchIndexError),

    /// Writing or clearing documents failed.
    #[error("Index write error: {0}")]
    IndexWriteError(SearchIndexError),

    /// Dropping or swapping the index failed.
    #[error("Index admin error: {0}")]
    IndexAdminError(SearchIndexError),

    /// Search query execution failed.
    #[error("Query error: {0}")]
    QueryError(SearchIndexError),

    /// The provided query is invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SearchError {
    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Whether the failed operation is worth retrying.
    ///
    /// Only document writes are retried; provisioning and admin failures are
    /// surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::IndexWriteError(source) => source.is_transient(),
            SearchError::IndexProvisioningError(_)
            | SearchError::IndexAdminError(_)
            | SearchError::QueryError(_)
            | SearchError::InvalidQuery(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_writes_are_retryable() {
        let transient = SearchIndexError::connection("reset by peer");
        let permanent = SearchIndexError::TaskFailed {
            task_uid: 7,
            code: Some("invalid_document_fields".to_string()),
            message: "bad field".to_string(),
        };

        assert!(SearchError::IndexWriteError(transient.clone()).is_retryable());
        assert!(!SearchError::IndexWriteError(permanent).is_retryable());
        assert!(!SearchError::IndexProvisioningError(transient.clone()).is_retryable());
        assert!(!SearchError::IndexAdminError(transient).is_retryable());
    }

    #[test]
    fn test_display_names_the_operation() {
        let err = SearchError::IndexWriteError(SearchIndexError::timeout("30s elapsed"));
        assert_eq!(err.to_string(), "Index write error: Timeout: 30s elapsed");
    }
}
