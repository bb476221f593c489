//! Trait definitions for the downloader module.

use async_trait::async_trait;
use std::path::Path;

use super::error::DownloadError;

/// Fetches one item into the media directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Downloads the item named by `identifier` into `media_dir`.
    ///
    /// `Ok` means the item is on disk; only then may it be marked seen.
    async fn download(&self, identifier: &str, media_dir: &Path) -> Result<(), DownloadError>;

    /// Validates that the downloader is properly configured and ready.
    async fn validate(&self) -> Result<(), DownloadError>;
}
