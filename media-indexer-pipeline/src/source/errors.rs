//! Source error types.

use thiserror::Error;

/// Errors that can occur while talking to the catalog source.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Failed to reach the source.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within its timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The source answered with a non-success status.
    #[error("HTTP error (status {status}): {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The configured source URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::ConnectionError(_) | SourceError::Timeout(_) => true,
            SourceError::HttpError { status, .. } => *status == 429 || *status >= 500,
            SourceError::ParseError(_) | SourceError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
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
