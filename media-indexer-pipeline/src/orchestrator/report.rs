//! Run bookkeeping and the report returned to callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use media_indexer_shared::ContentType;

/// Message reported by a successful run.
pub const SUCCESS_MESSAGE: &str = "All items have been added to the search index.";

/// Message reported when a run is rejected by the run guard.
pub const BUSY_MESSAGE: &str = "A sync run is already in progress.";

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
    Busy,
}

/// How a run writes into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Write into the live index type by type; a failure keeps what was
    /// already written.
    #[default]
    Incremental,
    /// Write into a staging index and swap it in only when every type
    /// succeeded.
    Atomic,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Incremental => write!(f, "incremental"),
            SyncMode::Atomic => write!(f, "atomic"),
        }
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incremental" => Ok(SyncMode::Incremental),
            "atomic" => Ok(SyncMode::Atomic),
            other => Err(format!("Unknown sync mode: {}", other)),
        }
    }
}

/// Phase of the orchestrator, observable while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "contentType", rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    /// Fetching and mapping pages of a content type.
    Running(ContentType),
    /// Writing a content type's buffer to the index.
    Flushing(ContentType),
}

/// Counters of one content type within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeProgress {
    pub content_type: ContentType,
    /// Total reported by the count probe.
    pub total: u64,
    /// Pages planned from the total and the page size.
    pub total_batches: u64,
    /// Pages actually fetched.
    pub batches: u64,
    pub indexed: usize,
    pub skipped: usize,
}

impl TypeProgress {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            total: 0,
            total_batches: 0,
            batches: 0,
            indexed: 0,
            skipped: 0,
        }
    }
}

/// Outcome of one invocation of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Absent when the run was rejected before starting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub status: SyncStatus,
    pub message: String,
    pub mode: SyncMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    pub types: Vec<TypeProgress>,
}

impl SyncReport {
    /// Report of a run rejected because another one is in flight.
    pub fn busy(mode: SyncMode) -> Self {
        Self {
            run_id: None,
            status: SyncStatus::Busy,
            message: BUSY_MESSAGE.to_string(),
            mode,
            started_at: None,
            elapsed_ms: 0,
            types: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }

    /// Documents written across all types.
    pub fn indexed(&self) -> usize {
        self.types.iter().map(|t| t.indexed).sum()
    }

    /// Records skipped across all types.
    pub fn skipped(&self) -> usize {
        self.types.iter().map(|t| t.skipped).sum()
    }

    /// Counters of one content type, if the run reached it.
    pub fn progress(&self, content_type: ContentType) -> Option<&TypeProgress> {
        self.types.iter().find(|t| t.content_type == content_type)
    }
}
