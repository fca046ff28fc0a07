//! Catalog source module for the media indexer pipeline.
//!
//! Provides the `CatalogSource` abstraction over the remote media catalog and
//! its Jellyfin implementation.

mod errors;
mod jellyfin;
mod messages;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use errors::SourceError;
pub use jellyfin::{JellyfinClient, JellyfinConfig};
pub use messages::{ItemsPage, ItemsQuery, RawCatalogRecord, SOURCE_FIELDS};

/// Paginated read access to the media catalog.
///
/// Implementations are injected into the `BatchFetcher` so that tests can
/// replace the remote server with a scripted double.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List one page of items matching `query`, together with the total
    /// number of items of that type.
    async fn list_items(&self, query: &ItemsQuery) -> Result<ItemsPage, SourceError>;
}
