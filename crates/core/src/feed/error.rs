//! Error types for the feed module.

use thiserror::Error;

/// Errors that can occur while fetching a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request timed out.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Could not connect to the feed host.
    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Feed {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The document could not be parsed as Atom or RSS.
    #[error("Failed to parse feed: {reason}")]
    Parse { reason: String },

    /// Any other transport failure.
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl FetchError {
    /// Creates a parse error.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// Whether trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } | Self::Request { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Parse { .. } => false,
        }
    }
}
