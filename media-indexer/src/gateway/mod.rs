//! HTTP gateway.
//!
//! Exposes search over the catalog index and the admin routes that trigger
//! and manage syncs. Admin routes require the configured token in the
//! `Authorization` header.

mod auth;
mod requests_logging;
mod routes;
mod state;

use std::future::Future;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::IndexingError;

pub use auth::require_token;
pub use requests_logging::log_requests;
pub use routes::{SearchParams, StatusBody};
pub use state::GatewayState;

pub fn make_app(state: GatewayState) -> Router {
    let admin_routes = Router::new()
        .route("/create-index", post(routes::create_index))
        .route("/clear-index", post(routes::clear_index))
        .route("/delete-index", delete(routes::delete_index))
        .route("/status", get(routes::status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/up", get(routes::up))
        .route("/search", get(routes::search))
        .merge(admin_routes)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Serve the gateway on `0.0.0.0:port` until `shutdown` resolves.
pub async fn run_gateway(
    state: GatewayState,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), IndexingError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(address = %listener.local_addr()?, "Gateway listening");

    axum::serve(listener, make_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
