//! Document mapper implementation.
//!
//! Selects the whitelisted fields of a raw record and tags the result with
//! the content type being scanned.

use std::fmt;

use tracing::debug;

use crate::source::RawCatalogRecord;
use media_indexer_shared::{CatalogItem, ContentType};

/// Why a record was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The record has no usable identifier.
    MissingId,
    /// The source reported a different type than the one being scanned.
    TypeMismatch { reported: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingId => write!(f, "record has no identifier"),
            SkipReason::TypeMismatch { reported } => {
                write!(f, "record reports type `{}`", reported)
            }
        }
    }
}

/// Projects raw records into `CatalogItem`s.
///
/// Projection is pure: the input record is only read, missing optional fields
/// stay absent, and fields outside the whitelist are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMapper;

impl DocumentMapper {
    pub fn new() -> Self {
        Self
    }

    /// Project `record`, scanned under `content_type`, into a document.
    ///
    /// Records without an identifier and records whose reported type
    /// differs from `content_type` are rejected with the reason. A record
    /// that reports no type at all is taken to be of the scanned type.
    pub fn project(
        &self,
        content_type: ContentType,
        record: &RawCatalogRecord,
    ) -> Result<CatalogItem, SkipReason> {
        let id = match record.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(SkipReason::MissingId),
        };

        if let Some(reported) = record.item_type.as_deref() {
            if reported != content_type.as_str() {
                debug!(id = %id, reported, expected = %content_type, "Type mismatch");
                return Err(SkipReason::TypeMismatch {
                    reported: reported.to_string(),
                });
            }
        }

        Ok(CatalogItem {
            id,
            name: record.name.clone(),
            item_type: content_type,
            media_type: record.media_type.clone(),
            is_folder: record.is_folder,
            container: record.container.clone(),
            production_year: record.production_year,
            original_title: record.original_title.clone(),
            overview: record.overview.clone(),
            critic_rating: record.critic_rating,
            official_rating: record.official_rating.clone(),
            genres: record.genres.clone(),
            studios: record.studios.clone(),
            people: record.people.clone(),
            taglines: record.taglines.clone(),
            run_time_ticks: record.run_time_ticks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_indexer_shared::NameIdPair;
    use serde_json::{json, Value};

    fn full_record() -> RawCatalogRecord {
        serde_json::from_value(json!({
            "Id": "f00d",
            "Name": "Blade Runner",
            "Type": "Movie",
            "MediaType": "Video",
            "IsFolder": false,
            "Container": "mkv",
            "ProductionYear": 1982,
            "OriginalTitle": "Blade Runner",
            "Overview": "A blade runner must pursue four replicants.",
            "CriticRating": 89.0,
            "OfficialRating": "R",
            "Genres": ["Science Fiction", "Drama"],
            "Studios": [{ "Name": "Warner Bros.", "Id": "st1" }],
            "People": [{ "Name": "Harrison Ford", "Id": "p1", "Role": "Deckard", "Type": "Actor" }],
            "Taglines": ["Man has made his match."],
            "RunTimeTicks": 70_200_000_000i64,
            "ServerId": "abc",
            "UserData": { "Played": false }
        }))
        .unwrap()
    }

    #[test]
    fn test_projects_whitelisted_fields_only() {
        let record = full_record();

        let item = DocumentMapper::new()
            .project(ContentType::Movie, &record)
            .unwrap();

        assert_eq!(item.id, "f00d");
        assert_eq!(item.item_type, ContentType::Movie);
        assert_eq!(item.production_year, Some(1982));
        assert_eq!(item.genres.as_ref().unwrap().len(), 2);
        assert_eq!(
            item.studios,
            Some(vec![NameIdPair {
                name: Some("Warner Bros.".to_string()),
                id: Some("st1".to_string())
            }])
        );

        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("ServerId").is_none());
        assert!(value.get("UserData").is_none());
        assert_eq!(value["People"][0]["Role"], "Deckard");
    }

    #[test]
    fn test_missing_optional_fields_stay_absent() {
        let record = RawCatalogRecord::new("e1", "Episode");

        let item = DocumentMapper::new()
            .project(ContentType::Episode, &record)
            .unwrap();
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value, json!({ "Id": "e1", "Type": "Episode" }));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let record = full_record();
        let before = record.clone();

        let _ = DocumentMapper::new().project(ContentType::Movie, &record);

        assert_eq!(record, before);
    }

    #[test]
    fn test_record_without_id_is_skipped() {
        let mut record = RawCatalogRecord::new("", "Movie");
        assert_eq!(
            DocumentMapper::new().project(ContentType::Movie, &record),
            Err(SkipReason::MissingId)
        );

        record.id = None;
        assert_eq!(
            DocumentMapper::new().project(ContentType::Movie, &record),
            Err(SkipReason::MissingId)
        );
    }

    #[test]
    fn test_foreign_type_is_skipped() {
        let record = RawCatalogRecord::new("s1", "Season");

        let result = DocumentMapper::new().project(ContentType::Series, &record);

        assert_eq!(
            result,
            Err(SkipReason::TypeMismatch {
                reported: "Season".to_string()
            })
        );
    }

    #[test]
    fn test_untyped_record_takes_scanned_type() {
        let mut record = RawCatalogRecord::new("a1", "Audio");
        record.item_type = None;
        record.extra.insert("Album".to_string(), Value::from("Kind of Blue"));

        let item = DocumentMapper::new()
            .project(ContentType::Audio, &record)
            .unwrap();

        assert_eq!(item.item_type, ContentType::Audio);
    }
}
