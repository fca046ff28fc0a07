//! Orchestrator module for the media indexer pipeline.
//!
//! Coordinates the fetcher, mapper and loader components over every content
//! type and turns the result into a single report.

mod lease;
mod report;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::fetcher::{batch_count, BatchFetcher};
use crate::loader::CatalogLoader;
use crate::processor::DocumentMapper;
use crate::retry::RetryPolicy;
use media_indexer_repository::{IndexManager, SearchError};
use media_indexer_shared::{CatalogItem, ContentType};

pub use lease::RunLease;
pub use report::{
    RunPhase, SyncMode, SyncReport, SyncStatus, TypeProgress, BUSY_MESSAGE, SUCCESS_MESSAGE,
};

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// How runs write into the index.
    pub mode: SyncMode,
    /// Retry policy for document writes.
    pub write_retry: RetryPolicy,
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Walks the content types in a fixed order, one at a time
/// - Buffers each type's documents and flushes them in one write
/// - Stops at the first failing type
/// - Admits a single run at a time
///
/// It is meant to be shared behind an `Arc` by every trigger (scheduler,
/// gateway).
pub struct Orchestrator {
    fetcher: BatchFetcher,
    mapper: DocumentMapper,
    index: IndexManager,
    config: OrchestratorConfig,
    running: Arc<AtomicBool>,
    phase_tx: watch::Sender<RunPhase>,
    last_report_tx: watch::Sender<Option<SyncReport>>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(fetcher: BatchFetcher, index: IndexManager) -> Self {
        Self::with_config(fetcher, index, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(fetcher: BatchFetcher, index: IndexManager, config: OrchestratorConfig) -> Self {
        let (phase_tx, _) = watch::channel(RunPhase::Idle);
        let (last_report_tx, _) = watch::channel(None);

        Self {
            fetcher,
            mapper: DocumentMapper::new(),
            index,
            config,
            running: Arc::new(AtomicBool::new(false)),
            phase_tx,
            last_report_tx,
        }
    }

    /// The live index this orchestrator fills.
    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    pub fn mode(&self) -> SyncMode {
        self.config.mode
    }

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        *self.phase_tx.borrow()
    }

    /// Subscribe to phase changes.
    pub fn subscribe_phase(&self) -> watch::Receiver<RunPhase> {
        self.phase_tx.subscribe()
    }

    /// Report of the most recent completed run, if any.
    pub fn last_report(&self) -> Option<SyncReport> {
        self.last_report_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Acquire the run lease.
    ///
    /// Fails immediately with `ConcurrentRunRejected` when another run holds
    /// it. The lease is released when dropped.
    pub fn try_begin(&self) -> Result<RunLease, PipelineError> {
        RunLease::acquire(&self.running).ok_or(PipelineError::ConcurrentRunRejected)
    }

    /// Run a full sync. Never fails: errors are captured in the report, and a
    /// call made while another run is in flight returns a `busy` report
    /// without touching the active run.
    pub async fn run(&self) -> SyncReport {
        match self.try_begin() {
            Ok(lease) => self.run_leased(lease).await,
            Err(_) => {
                info!("Sync run rejected, another run is in progress");
                SyncReport::busy(self.config.mode)
            }
        }
    }

    /// Run a full sync under an already acquired lease.
    #[instrument(skip(self, lease), fields(run_id = tracing::field::Empty, mode = %self.config.mode))]
    pub async fn run_leased(&self, lease: RunLease) -> SyncReport {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let started_at = Utc::now();
        let clock = Instant::now();
        let mut types = Vec::with_capacity(ContentType::ALL.len());

        info!("Starting sync run");

        let result = match self.config.mode {
            SyncMode::Incremental => self.sync_incremental(&mut types).await,
            SyncMode::Atomic => self.sync_atomic(&mut types).await,
        };

        let (status, message) = match result {
            Ok(()) => (SyncStatus::Success, SUCCESS_MESSAGE.to_string()),
            Err(e) => (SyncStatus::Error, format!("Error occurred: {}", e)),
        };

        let report = SyncReport {
            run_id: Some(run_id),
            status,
            message,
            mode: self.config.mode,
            started_at: Some(started_at),
            elapsed_ms: clock.elapsed().as_millis() as u64,
            types,
        };

        match report.status {
            SyncStatus::Success => info!(
                indexed = report.indexed(),
                skipped = report.skipped(),
                elapsed_ms = report.elapsed_ms,
                "Sync run completed"
            ),
            _ => error!(
                message = %report.message,
                elapsed_ms = report.elapsed_ms,
                "Sync run failed"
            ),
        }

        self.phase_tx.send_replace(RunPhase::Idle);
        self.last_report_tx.send_replace(Some(report.clone()));
        drop(lease);

        report
    }

    /// Sync straight into the live index, provisioning it first.
    async fn sync_incremental(&self, types: &mut Vec<TypeProgress>) -> Result<(), RunFailure> {
        // the index may have been dropped since startup
        self.index.ensure_index().await?;
        self.sync_all(&self.index, types).await
    }

    /// Sync into a staging index and swap it in on success.
    async fn sync_atomic(&self, types: &mut Vec<TypeProgress>) -> Result<(), RunFailure> {
        let staging = self.index.staging();

        // A crashed earlier run may have left its staging index behind.
        staging.discard().await?;
        staging.ensure_index().await?;

        let outcome = match self.sync_all(&staging, types).await {
            Ok(()) => self.swap_in(&staging).await.map_err(RunFailure::from),
            Err(e) => Err(e),
        };

        if outcome.is_err() {
            if let Err(e) = staging.discard().await {
                warn!(error = %e, "Failed to drop staging index");
            }
        }
        outcome
    }

    /// Replace the live index with the staging index.
    async fn swap_in(&self, staging: &IndexManager) -> Result<(), PipelineError> {
        // the swap needs both indexes to exist
        self.index.ensure_index().await?;
        self.index.promote(staging).await?;
        Ok(())
    }

    /// Sync every content type in order, stopping at the first failure.
    async fn sync_all(
        &self,
        target: &IndexManager,
        types: &mut Vec<TypeProgress>,
    ) -> Result<(), RunFailure> {
        let loader = CatalogLoader::with_retry(target.clone(), self.config.write_retry.clone());

        for content_type in ContentType::ALL {
            let mut progress = TypeProgress::new(content_type);
            let result = self.sync_type(&loader, content_type, &mut progress).await;
            types.push(progress);
            result.map_err(|error| RunFailure::during(content_type, error))?;
        }

        Ok(())
    }

    /// Fetch, map and flush one content type.
    #[instrument(skip(self, loader, progress))]
    async fn sync_type(
        &self,
        loader: &CatalogLoader,
        content_type: ContentType,
        progress: &mut TypeProgress,
    ) -> Result<(), PipelineError> {
        self.phase_tx.send_replace(RunPhase::Running(content_type));

        let page_size = self.fetcher.page_size();
        let total = self.fetcher.probe_total(content_type).await?;
        let total_batches = batch_count(total, page_size);
        progress.total = total;
        progress.total_batches = total_batches;

        info!(total, total_batches, "Syncing content type");

        let mut buffer: Vec<CatalogItem> = Vec::new();
        for batch in 0..total_batches {
            let offset = batch * page_size as u64;
            let records = self
                .fetcher
                .fetch_page(content_type, offset, page_size)
                .await?;
            progress.batches += 1;
            let fetched = records.len();

            for record in &records {
                match self.mapper.project(content_type, record) {
                    Ok(item) => buffer.push(item),
                    Err(reason) => {
                        progress.skipped += 1;
                        warn!(id = ?record.id, reason = %reason, "Skipping record");
                    }
                }
            }

            info!(
                batch = batch + 1,
                total_batches,
                count = fetched,
                "Fetched batch"
            );

            if fetched < page_size {
                break;
            }
        }

        self.phase_tx.send_replace(RunPhase::Flushing(content_type));
        progress.indexed = loader.flush(content_type, buffer).await?;

        Ok(())
    }
}

/// Error that ended a run, with the content type being synced if any.
#[derive(Debug)]
struct RunFailure {
    content_type: Option<ContentType>,
    error: PipelineError,
}

impl RunFailure {
    fn during(content_type: ContentType, error: PipelineError) -> Self {
        Self {
            content_type: Some(content_type),
            error,
        }
    }
}

impl From<PipelineError> for RunFailure {
    fn from(error: PipelineError) -> Self {
        Self {
            content_type: None,
            error,
        }
    }
}

impl From<SearchError> for RunFailure {
    fn from(error: SearchError) -> Self {
        PipelineError::from(error).into()
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.content_type {
            Some(content_type) => write!(f, "{} sync failed: {}", content_type, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}
