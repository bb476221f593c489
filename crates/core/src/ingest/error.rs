//! Error types for the ingest module.

use thiserror::Error;

use crate::config::ConfigError;
use crate::downloader::DownloadError;
use crate::feed::FetchError;
use crate::retention::RetentionError;
use crate::seen::SeenError;

/// Errors that end an ingestion run.
///
/// Per-feed, per-item and per-file failures are not errors; they are
/// collected in the run report.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A subscription or other setting is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The feed client could not be built.
    #[error("feed client error: {0}")]
    FeedClient(#[from] FetchError),

    /// The downloader cannot run at all (e.g. the program is missing).
    #[error("downloader unavailable: {0}")]
    Downloader(#[from] DownloadError),

    /// The seen-set could not be loaded or saved.
    #[error("seen-set error: {0}")]
    Seen(#[from] SeenError),

    /// The media directory could not be scanned.
    #[error("retention error: {0}")]
    Retention(#[from] RetentionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::from(ConfigError::InvalidSubscription {
            index: 2,
            reason: "empty channel_id".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "configuration error: Invalid subscription #2: empty channel_id"
        );
    }
}
