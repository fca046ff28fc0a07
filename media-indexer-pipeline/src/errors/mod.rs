//! Error types for the media indexer pipeline.

use media_indexer_repository::SearchError;
use media_indexer_shared::ContentType;
use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur while running the pipeline.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// The catalog source could not serve a request for a content type.
    #[error("Source unavailable while fetching {content_type}: {source}")]
    SourceUnavailable {
        content_type: ContentType,
        #[source]
        source: SourceError,
    },

    /// The index could not be created or its schema could not be applied.
    #[error("Index provisioning failed: {0}")]
    IndexProvisioning(#[source] SearchError),

    /// Documents could not be written to or cleared from the index.
    #[error("Index write failed: {0}")]
    IndexWrite(#[source] SearchError),

    /// The index could not be dropped or swapped.
    #[error("Index administration failed: {0}")]
    IndexAdmin(#[source] SearchError),

    /// A query against the index failed.
    #[error("Index query failed: {0}")]
    IndexQuery(#[source] SearchError),

    /// Another run holds the run lease.
    #[error("A sync run is already in progress")]
    ConcurrentRunRejected,
}

impl PipelineError {
    /// Create a source error for the given content type.
    pub fn source_unavailable(content_type: ContentType, source: SourceError) -> Self {
        Self::SourceUnavailable {
            content_type,
            source,
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::IndexProvisioningError(_) => Self::IndexProvisioning(err),
            SearchError::IndexWriteError(_) => Self::IndexWrite(err),
            SearchError::IndexAdminError(_) => Self::IndexAdmin(err),
            SearchError::QueryError(_) | SearchError::InvalidQuery(_) => Self::IndexQuery(err),
        }
    }
}
