//! Retention module: keeps the media directory within age and size limits.
//!
//! The directory itself is the source of truth. Each pass takes a fresh
//! [`MediaDirectory::scan`] and hands the snapshot to a pure planner
//! ([`plan_age_purge`], [`plan_size_purge`]) that picks victims by
//! [`MediaFile::earliest_time`]. [`RetentionEngine`] runs the age pass, then
//! the size pass against what the age pass left behind. Deletion failures are
//! recorded per file and never stop the remaining deletions.

mod directory;
mod engine;
mod error;
mod planner;
mod types;

pub use directory::{FsMediaDirectory, MediaDirectory};
pub use engine::RetentionEngine;
pub use error::RetentionError;
pub use planner::{oldest_first, plan_age_purge, plan_size_purge};
pub use types::{
    DeletionFailure, MediaFile, PassReport, RemovedFile, RetentionPolicy, RetentionReport,
};
