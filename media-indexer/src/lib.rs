//! # Media Indexer
//!
//! Main library for the media indexer service.
//!
//! This crate provides the configuration, wiring, HTTP gateway and scheduler
//! around the sync pipeline, and the entry point that runs them.

pub mod config;
pub mod gateway;
pub mod scheduler;
pub mod telemetry;
#[cfg(test)]
mod testing;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] media_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] media_indexer_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
