//! Types for the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::IngestError;

/// Errors returned by a scheduled or manual run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Another run holds the run lock.
    #[error("an ingestion run is already in progress")]
    RunInProgress,

    /// The run ended with an error.
    #[error("ingestion run failed: {0}")]
    Ingest(#[from] IngestError),

    /// The run panicked. The seen-set was persisted without pruning.
    #[error("ingestion run crashed: {0}")]
    Crashed(String),
}

/// Current state of the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Whether the background loop is running.
    pub running: bool,
    /// Whether a run currently holds the run lock.
    pub run_in_progress: bool,
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}
