//! Token check of the admin routes.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use super::state::GatewayState;

/// Let the request through only if its `Authorization` header equals the
/// configured token.
pub async fn require_token(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match (state.auth_token.as_deref(), provided) {
        (Some(expected), Some(provided)) if expected == provided => next.run(request).await,
        _ => {
            warn!(path = %request.uri().path(), "Rejected request with invalid token");
            forbidden()
        }
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "status": "error", "message": "Forbidden: Invalid token" })),
    )
        .into_response()
}
