use dotenv::dotenv;
use tracing::{error, info, warn};

use media_indexer::gateway::{run_gateway, GatewayState};
use media_indexer::scheduler::spawn_scheduler;
use media_indexer::telemetry::init_tracing;
use media_indexer::{Dependencies, IndexingError, Settings};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    let deps = Dependencies::new(&settings).await?;
    let orchestrator = deps.orchestrator;

    if let Err(e) = orchestrator.index().ensure_index().await {
        error!(error = %e, "Failed to provision the search index");
        return Err(e.into());
    }

    let scheduler = match settings.scrape_interval {
        Some(period) => Some(spawn_scheduler(orchestrator.clone(), period)),
        None => {
            info!("Scheduled sync disabled");
            None
        }
    };

    let state = GatewayState::new(orchestrator, settings.gateway_auth_token.clone());
    if state.auth_token.is_none() {
        warn!("GATEWAY_AUTH_TOKEN is not set, admin routes are closed");
    }

    run_gateway(state, settings.port, shutdown_signal()).await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!("Media indexer stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
