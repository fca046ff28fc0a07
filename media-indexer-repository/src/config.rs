//! Configuration types for the IndexManager.

use crate::types::IndexSchema;

/// The default uid of the catalog index.
pub const DEFAULT_INDEX_NAME: &str = "jellyfin_items";

/// Suffix appended to the live index uid to name its staging index.
pub const STAGING_SUFFIX: &str = "_staging";

/// Configuration for the IndexManager.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Uid of the index the manager operates on.
    pub index_name: String,
    /// Schema applied by `ensure_index`.
    pub schema: IndexSchema,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            schema: IndexSchema::catalog(),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config for the named index with the catalog schema.
    pub fn with_index_name(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Default::default()
        }
    }

    /// The same configuration targeting the staging copy of the index.
    pub fn staging(&self) -> Self {
        Self {
            index_name: format!("{}{}", self.index_name, STAGING_SUFFIX),
            schema: self.schema.clone(),
        }
    }
}
