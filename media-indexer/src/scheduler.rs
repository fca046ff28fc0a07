//! Periodic sync trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use media_indexer_pipeline::{Orchestrator, SyncReport, SyncStatus};

/// Spawn a task that runs a sync every `period`.
///
/// The first run happens one period after the call. Ticks missed while a
/// run is in flight are skipped rather than replayed.
pub fn spawn_scheduler(orchestrator: Arc<Orchestrator>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "Starting sync scheduler");

    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_scheduled(&orchestrator).await;
        }
    })
}

/// Run one sync and log its outcome.
pub async fn run_scheduled(orchestrator: &Orchestrator) -> SyncReport {
    let report = orchestrator.run().await;
    log_report("scheduler", &report);
    report
}

/// Log the outcome of a run started by `trigger`.
pub(crate) fn log_report(trigger: &str, report: &SyncReport) {
    let seconds = report.elapsed_ms as f64 / 1000.0;
    match report.status {
        SyncStatus::Success => info!(
            trigger,
            indexed = report.indexed(),
            skipped = report.skipped(),
            "Scrape completed in {:.2} seconds",
            seconds
        ),
        SyncStatus::Busy => info!(trigger, "Skipping sync, a run is already in progress"),
        SyncStatus::Error => error!(
            trigger,
            message = %report.message,
            "Scrape failed after {:.2} seconds",
            seconds
        ),
    }
}
