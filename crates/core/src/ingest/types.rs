//! Types for the ingest module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::retention::RetentionReport;
use crate::seen::SessionSummary;

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fetch feeds and plan, but download and delete nothing.
    pub dry_run: bool,
    /// Leave the media directory untouched after downloading.
    pub skip_retention: bool,
}

/// A feed that could not be fetched this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFailure {
    pub url: String,
    pub reason: String,
}

/// An item whose download failed. It stays unseen and is retried next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFailure {
    pub identifier: String,
    pub title: String,
    pub reason: String,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Feed URLs resolved from the subscriptions.
    pub feeds: usize,
    /// Feeds fetched successfully.
    pub feeds_fetched: usize,
    pub feed_failures: Vec<FeedFailure>,
    /// Entries seen across all fetched feeds, duplicates included.
    pub entries: usize,
    /// Entries skipped because they were already seen.
    pub skipped: usize,
    /// Identifiers downloaded, in order. In a dry run, those that would be.
    pub downloaded: Vec<String>,
    pub download_failures: Vec<DownloadFailure>,
    pub session: Option<SessionSummary>,
    /// `None` when retention was skipped.
    pub retention: Option<RetentionReport>,
}

impl RunReport {
    pub(crate) fn begin(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            dry_run,
            feeds: 0,
            feeds_fetched: 0,
            feed_failures: Vec::new(),
            entries: 0,
            skipped: 0,
            downloaded: Vec::new(),
            download_failures: Vec::new(),
            session: None,
            retention: None,
        }
    }

    /// Whether every feed, download and deletion succeeded.
    pub fn is_clean(&self) -> bool {
        self.feed_failures.is_empty()
            && self.download_failures.is_empty()
            && self
                .retention
                .as_ref()
                .map_or(true, |r| r.failure_count() == 0)
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
