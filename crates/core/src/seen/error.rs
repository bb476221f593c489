//! Error types for the seen module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving the seen-set.
#[derive(Debug, Error)]
pub enum SeenError {
    /// Failed to read the state file.
    #[error("Failed to read seen-set from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the state file.
    #[error("Failed to write seen-set to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
