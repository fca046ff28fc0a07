//! Wire types of the catalog source.
//!
//! The Jellyfin `/Items` endpoint answers with PascalCase JSON. Records carry
//! many more fields than the index needs; anything outside the whitelist is
//! kept in `extra` so that nothing is silently lost before projection.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use media_indexer_shared::{ContentType, NameIdPair, PersonInfo};

/// Fields requested from the source for every page.
pub const SOURCE_FIELDS: [&str; 16] = [
    "Id",
    "Name",
    "Type",
    "MediaType",
    "IsFolder",
    "Container",
    "ProductionYear",
    "OriginalTitle",
    "Overview",
    "CriticRating",
    "OfficialRating",
    "Genres",
    "Studios",
    "People",
    "Taglines",
    "RunTimeTicks",
];

/// One item as returned by the source, before projection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCatalogRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Reported item type. Kept as text since the source knows more types
    /// than are indexed.
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub is_folder: Option<bool>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub critic_rating: Option<f64>,
    #[serde(default)]
    pub official_rating: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub studios: Option<Vec<NameIdPair>>,
    #[serde(default)]
    pub people: Option<Vec<PersonInfo>>,
    #[serde(default)]
    pub taglines: Option<Vec<String>>,
    #[serde(default)]
    pub run_time_ticks: Option<i64>,
    /// Every field outside the whitelist.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RawCatalogRecord {
    /// A record with only the identifier and reported type set.
    pub fn new(id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            item_type: Some(item_type.into()),
            ..Default::default()
        }
    }
}

/// One page of the `/Items` listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<RawCatalogRecord>,
    /// Number of items of the requested type, regardless of paging.
    #[serde(default)]
    pub total_record_count: u64,
}

/// Parameters of one `/Items` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsQuery {
    pub content_type: ContentType,
    pub start_index: u64,
    pub limit: usize,
    /// Whether to ask for the whitelisted fields. Count probes do not.
    pub with_fields: bool,
}

impl ItemsQuery {
    /// A single-item request used to learn the total count of a type.
    pub fn probe(content_type: ContentType) -> Self {
        Self {
            content_type,
            start_index: 0,
            limit: 1,
            with_fields: false,
        }
    }

    /// A page request starting at `start_index`.
    pub fn page(content_type: ContentType, start_index: u64, limit: usize) -> Self {
        Self {
            content_type,
            start_index,
            limit,
            with_fields: true,
        }
    }
}
