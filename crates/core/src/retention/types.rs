//! Types for the retention module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// One regular, non-hidden file in the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// File name, used for logging and as the ordering tie-break.
    pub name: String,
    pub size: u64,
    pub accessed: SystemTime,
    pub modified: SystemTime,
    /// Last status change (ctime on Unix).
    pub changed: SystemTime,
}

impl MediaFile {
    /// A file whose three timestamps are all `time`.
    pub fn new(path: impl Into<PathBuf>, size: u64, time: SystemTime) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            size,
            accessed: time,
            modified: time,
            changed: time,
        }
    }

    /// Earliest known time for this file; its effective age.
    pub fn earliest_time(&self) -> SystemTime {
        self.accessed.min(self.modified).min(self.changed)
    }
}

/// Age and size bounds for the media directory. `None` disables a bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Option<Duration>,
    pub max_size: Option<u64>,
}

impl RetentionPolicy {
    pub fn is_unbounded(&self) -> bool {
        self.max_age.is_none() && self.max_size.is_none()
    }
}

/// A file removed (or, in a dry run, selected for removal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedFile {
    pub name: String,
    pub size: u64,
}

/// A file that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of one retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub removed: Vec<RemovedFile>,
    pub failures: Vec<DeletionFailure>,
    pub bytes_freed: u64,
}

/// Outcome of a full retention run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionReport {
    /// `None` when no age bound is configured.
    pub age_pass: Option<PassReport>,
    /// `None` when no size bound is configured.
    pub size_pass: Option<PassReport>,
    pub remaining_files: usize,
    pub remaining_bytes: u64,
    pub dry_run: bool,
}

impl RetentionReport {
    /// Number of files removed across both passes.
    pub fn removed_count(&self) -> usize {
        self.passes().map(|p| p.removed.len()).sum()
    }

    /// Number of failed deletions across both passes.
    pub fn failure_count(&self) -> usize {
        self.passes().map(|p| p.failures.len()).sum()
    }

    fn passes(&self) -> impl Iterator<Item = &PassReport> {
        self.age_pass.iter().chain(self.size_pass.iter())
    }
}
