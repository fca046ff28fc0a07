//! # Media Indexer Pipeline
//!
//! This crate provides the pipeline components that copy the media catalog
//! from a Jellyfin server into the search index.
//!
//! ## Architecture
//!
//! The pipeline follows the Source-Fetcher-Processor-Loader pattern:
//!
//! 1. **Source**: Lists catalog items page by page
//! 2. **Fetcher**: Probes item counts and walks the pages of a content type
//! 3. **Processor**: Projects raw records into index documents
//! 4. **Loader**: Writes each content type's documents to the index
//! 5. **Orchestrator**: Runs the content types in order and reports the outcome

pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod retry;
pub mod source;

pub use errors::PipelineError;
pub use fetcher::BatchFetcher;
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunPhase, SyncMode, SyncReport, SyncStatus};
pub use retry::RetryPolicy;
pub use source::{CatalogSource, JellyfinClient, JellyfinConfig};
