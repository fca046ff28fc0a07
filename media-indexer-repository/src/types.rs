//! Request and response types for search index operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative description of the target index.
///
/// Applying the same schema repeatedly leaves the index in the same state:
/// the primary key is only used at creation time, and the attribute sets
/// replace whatever was configured before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    /// Field holding the document identifier.
    pub primary_key: String,
    /// Fields usable in filter expressions.
    pub filterable_attributes: Vec<String>,
    /// Fields usable for ordering results.
    pub sortable_attributes: Vec<String>,
}

impl IndexSchema {
    /// Schema of the catalog index: keyed by `Id`, filterable on the
    /// classification fields and sortable on name, year, rating and runtime.
    pub fn catalog() -> Self {
        Self {
            primary_key: "Id".to_string(),
            filterable_attributes: to_strings(&[
                "Type",
                "MediaType",
                "IsFolder",
                "Container",
                "OfficialRating",
            ]),
            sortable_attributes: to_strings(&[
                "Name",
                "ProductionYear",
                "CriticRating",
                "RunTimeTicks",
            ]),
        }
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::catalog()
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Metadata of an existing index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
}

/// A search request as understood by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
}

/// Raw hits returned by the engine, in ranking order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub estimated_total_hits: Option<u64>,
}
