//! Error types for the downloader module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while downloading an item.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Downloader binary not found.
    #[error("Downloader not found at path: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The downloader exited unsuccessfully.
    #[error("Download of {identifier} failed (exit code {code:?})")]
    Failed {
        identifier: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Download timed out.
    #[error("Download of {identifier} timed out after {timeout_secs} seconds")]
    Timeout {
        identifier: String,
        timeout_secs: u64,
    },

    /// I/O error while running the downloader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Creates a failed error from an exit status and captured stderr.
    pub fn failed(identifier: impl Into<String>, code: Option<i32>, stderr: Option<String>) -> Self {
        Self::Failed {
            identifier: identifier.into(),
            code,
            stderr,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ProgramNotFound { .. })
    }
}
