//! Shared state of the gateway handlers.

use std::sync::Arc;

use media_indexer_pipeline::Orchestrator;

#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    /// Expected `Authorization` header value. `None` closes the admin routes.
    pub auth_token: Option<Arc<str>>,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<Orchestrator>, auth_token: Option<String>) -> Self {
        Self {
            orchestrator,
            auth_token: auth_token.map(Arc::from),
        }
    }
}
