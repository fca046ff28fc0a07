//! Meilisearch task and error payloads.
//!
//! Every write in Meilisearch is enqueued as a task; the HTTP call answers
//! `202 Accepted` with a task summary and the outcome has to be polled.

use serde::Deserialize;

use crate::errors::SearchIndexError;

/// Error code reported when an index uid is already taken.
pub const INDEX_ALREADY_EXISTS: &str = "index_already_exists";

/// Error code reported when an index does not exist.
pub const INDEX_NOT_FOUND: &str = "index_not_found";

/// Response body of an accepted write.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedTask {
    pub task_uid: u64,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

/// Error body used both by failed HTTP calls and by failed tasks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// A task as returned by `GET /tasks/{uid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub uid: u64,
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl Task {
    /// Whether the task will not change state anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    /// Convert a terminal task into the outcome of the write it carried.
    pub fn into_result(self) -> Result<(), SearchIndexError> {
        match self.status {
            TaskStatus::Succeeded => Ok(()),
            TaskStatus::Canceled => Err(SearchIndexError::TaskFailed {
                task_uid: self.uid,
                code: None,
                message: "task was canceled".to_string(),
            }),
            _ => {
                let error = self.error.unwrap_or_default();
                match error.code.as_deref() {
                    Some(INDEX_ALREADY_EXISTS) => Err(SearchIndexError::IndexAlreadyExists(error.message)),
                    Some(INDEX_NOT_FOUND) => Err(SearchIndexError::IndexNotFound(error.message)),
                    _ => Err(SearchIndexError::TaskFailed {
                        task_uid: self.uid,
                        code: error.code,
                        message: error.message,
                    }),
                }
            }
        }
    }
}

/// Map a non-success HTTP answer to an error.
pub fn api_error(status: u16, body: &str) -> SearchIndexError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ApiErrorBody {
        message: body.to_string(),
        code: None,
    });

    match parsed.code.as_deref() {
        Some(INDEX_NOT_FOUND) => SearchIndexError::IndexNotFound(parsed.message),
        Some(INDEX_ALREADY_EXISTS) => SearchIndexError::IndexAlreadyExists(parsed.message),
        _ => SearchIndexError::ApiError {
            status,
            code: parsed.code,
            message: parsed.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_task_maps_known_codes() {
        let task: Task = serde_json::from_value(json!({
            "uid": 4,
            "status": "failed",
            "error": {
                "message": "Index `jellyfin_items` already exists.",
                "code": "index_already_exists",
                "type": "invalid_request",
                "link": "https://docs.meilisearch.com/errors#index_already_exists"
            }
        }))
        .unwrap();

        assert!(task.is_terminal());
        assert!(matches!(
            task.into_result(),
            Err(SearchIndexError::IndexAlreadyExists(_))
        ));
    }

    #[test]
    fn test_failed_task_keeps_unknown_codes() {
        let task: Task = serde_json::from_value(json!({
            "uid": 9,
            "status": "failed",
            "error": { "message": "missing primary key", "code": "missing_document_id" }
        }))
        .unwrap();

        match task.into_result() {
            Err(SearchIndexError::TaskFailed { task_uid, code, .. }) => {
                assert_eq!(task_uid, 9);
                assert_eq!(code.as_deref(), Some("missing_document_id"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_pending_task_is_not_terminal() {
        let task: Task = serde_json::from_value(json!({ "uid": 1, "status": "processing" })).unwrap();
        assert!(!task.is_terminal());
    }

    #[test]
    fn test_api_error_detects_missing_index() {
        let body = r#"{"message":"Index `x` not found.","code":"index_not_found","type":"invalid_request","link":""}"#;

        assert!(matches!(api_error(404, body), SearchIndexError::IndexNotFound(_)));
    }

    #[test]
    fn test_api_error_with_plain_body() {
        match api_error(502, "Bad Gateway") {
            SearchIndexError::ApiError { status, code, message } => {
                assert_eq!(status, 502);
                assert!(code.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
