//! Search request builders.
//!
//! Translates a gateway `SearchQuery` into the request sent to the engine.
//! Content-type restrictions become an OR'd chain of equality filters on the
//! `Type` attribute, e.g. `Type = 'Movie' OR Type = 'Series'`.

use media_indexer_shared::{ContentType, SearchQuery};

use crate::types::SearchRequest;

/// Name of the attribute holding the content type.
pub const TYPE_ATTRIBUTE: &str = "Type";

/// Build the filter expression restricting hits to the given types.
///
/// Returns `None` when no type is given, meaning "all types". Duplicates are
/// collapsed while preserving the caller's order.
pub fn build_type_filter(content_types: &[ContentType]) -> Option<String> {
    let mut seen: Vec<ContentType> = Vec::with_capacity(content_types.len());
    for content_type in content_types {
        if !seen.contains(content_type) {
            seen.push(*content_type);
        }
    }

    if seen.is_empty() {
        return None;
    }

    let clauses: Vec<String> = seen
        .iter()
        .map(|content_type| format!("{} = '{}'", TYPE_ATTRIBUTE, content_type))
        .collect();

    Some(clauses.join(" OR "))
}

/// Build the engine request for a gateway query.
///
/// Only the primary key is retrieved since the gateway answers with ids.
pub fn build_search_request(query: &SearchQuery, primary_key: &str) -> SearchRequest {
    SearchRequest {
        q: query.query.clone(),
        filter: build_type_filter(&query.content_types),
        limit: query.limit,
        offset: query.offset,
        attributes_to_retrieve: Some(vec![primary_key.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_types_means_no_filter() {
        assert_eq!(build_type_filter(&[]), None);
    }

    #[test]
    fn test_single_type_filter() {
        assert_eq!(
            build_type_filter(&[ContentType::Movie]),
            Some("Type = 'Movie'".to_string())
        );
    }

    #[test]
    fn test_types_are_ored() {
        let filter = build_type_filter(&[
            ContentType::Series,
            ContentType::Episode,
            ContentType::Series,
        ]);

        assert_eq!(
            filter,
            Some("Type = 'Series' OR Type = 'Episode'".to_string())
        );
    }

    #[test]
    fn test_search_request_retrieves_only_ids() {
        let query = SearchQuery::new("blade runner")
            .with_types(vec![ContentType::Movie])
            .with_limit(5);

        let request = build_search_request(&query, "Id");

        assert_eq!(request.q, "blade runner");
        assert_eq!(request.filter.as_deref(), Some("Type = 'Movie'"));
        assert_eq!(request.limit, Some(5));
        assert_eq!(request.offset, None);
        assert_eq!(request.attributes_to_retrieve, Some(vec!["Id".to_string()]));
    }
}
