//! Search request and response types used by the gateway.

use serde::{Deserialize, Serialize};

use crate::ContentType;

/// A free-text query against the catalog index.
///
/// `content_types` restricts hits to the listed types; an empty list means
/// every type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery {
    pub query: String,
    pub content_types: Vec<ContentType>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchQuery {
    /// Create a query over every content type.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Restrict the query to the given content types.
    pub fn with_types(mut self, content_types: Vec<ContentType>) -> Self {
        self.content_types = content_types;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Identifiers of the matching items, in engine ranking order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub ids: Vec<String>,
}
