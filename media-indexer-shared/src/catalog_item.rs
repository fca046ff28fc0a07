//! The normalized document stored in the search index.

use serde::{Deserialize, Serialize};

use crate::ContentType;

/// A studio (or any other named reference) attached to a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NameIdPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A person credited on a catalog item (actor, director, composer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Credit kind as reported by the source, e.g. `Actor` or `Director`.
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One media entity as stored in the search index.
///
/// Field names are serialized in the source's PascalCase spelling so that the
/// index schema (`Id` primary key, `Type` filter, ...) and gateway filter
/// expressions line up with what clients of the source already know.
/// Optional fields that are absent are omitted from the document entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogItem {
    /// Unique identifier; the index primary key. Never empty.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The content type this item was synchronized under.
    #[serde(rename = "Type")]
    pub item_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Synopsis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studios: Option<Vec<NameIdPair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<PersonInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taglines: Option<Vec<String>>,
    /// Runtime in 100-nanosecond ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time_ticks: Option<i64>,
}

impl CatalogItem {
    /// Create a document with only the identifier and type set.
    pub fn new(id: impl Into<String>, item_type: ContentType) -> Self {
        Self {
            id: id.into(),
            name: None,
            item_type,
            media_type: None,
            is_folder: None,
            container: None,
            production_year: None,
            original_title: None,
            overview: None,
            critic_rating: None,
            official_rating: None,
            genres: None,
            studios: None,
            people: None,
            taglines: None,
            run_time_ticks: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
