//! Gateway handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use media_indexer_pipeline::{RunPhase, SyncMode, SyncReport};
use media_indexer_shared::{ContentType, SearchQuery, UnknownContentType};

use super::state::GatewayState;
use crate::scheduler::log_report;

pub async fn up() -> StatusCode {
    StatusCode::OK
}

/// Query string of `GET /search`.
///
/// `includeItemTypes` may be repeated and each value may hold a comma
/// separated list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(default)]
    pub include_item_types: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchParams {
    fn content_types(&self) -> Result<Vec<ContentType>, UnknownContentType> {
        let mut types = Vec::new();
        for name in self
            .include_item_types
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            let content_type = name.parse()?;
            if !types.contains(&content_type) {
                types.push(content_type);
            }
        }
        Ok(types)
    }
}

fn search_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub async fn search(
    State(state): State<GatewayState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let text = match params.q.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return search_error(StatusCode::BAD_REQUEST, "No query provided"),
    };

    let content_types = match params.content_types() {
        Ok(types) => types,
        Err(e) => return search_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut query = SearchQuery::new(text).with_types(content_types);
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.with_offset(offset);
    }

    match state.orchestrator.index().search(&query).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, "Search failed");
            search_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred during the search",
            )
        }
    }
}

fn admin_reply(status: StatusCode, label: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": label, "message": message.into() })),
    )
        .into_response()
}

/// Start a sync in the background and acknowledge right away.
pub async fn create_index(State(state): State<GatewayState>) -> Response {
    let lease = match state.orchestrator.try_begin() {
        Ok(lease) => lease,
        Err(e) => {
            info!("Rejected on-demand sync, a run is already in progress");
            return admin_reply(StatusCode::CONFLICT, "busy", e.to_string());
        }
    };

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let report = orchestrator.run_leased(lease).await;
        log_report("gateway", &report);
    });

    admin_reply(
        StatusCode::OK,
        "job started",
        "Scraping job is running in the background.",
    )
}

pub async fn clear_index(State(state): State<GatewayState>) -> Response {
    match state.orchestrator.index().clear_all().await {
        Ok(()) => admin_reply(StatusCode::OK, "success", "Index cleared successfully."),
        Err(e) => {
            error!(error = %e, "Failed to clear index");
            admin_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "error",
                format!("Failed to clear index: {}", e),
            )
        }
    }
}

pub async fn delete_index(State(state): State<GatewayState>) -> Response {
    let index = state.orchestrator.index();
    match index.drop_index().await {
        Ok(()) => admin_reply(
            StatusCode::OK,
            "success",
            format!("Index `{}` deleted successfully.", index.index_name()),
        ),
        Err(e) => {
            error!(error = %e, "Failed to delete index");
            admin_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "error",
                format!("Failed to delete index: {}", e),
            )
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub state: RunPhase,
    pub running: bool,
    pub mode: SyncMode,
    pub last_run: Option<SyncReport>,
}

pub async fn status(State(state): State<GatewayState>) -> Json<StatusBody> {
    let orchestrator = &state.orchestrator;
    Json(StatusBody {
        state: orchestrator.phase(),
        running: orchestrator.is_running(),
        mode: orchestrator.mode(),
        last_run: orchestrator.last_report(),
    })
}
