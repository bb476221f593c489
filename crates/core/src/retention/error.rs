//! Error types for the retention module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a retention run. Per-file deletion failures are not
/// errors; they are recorded in the report.
#[derive(Debug, Error)]
pub enum RetentionError {
    /// The media directory could not be listed.
    #[error("Failed to scan media directory {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
