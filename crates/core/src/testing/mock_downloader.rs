//! Mock downloader for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::downloader::{DownloadError, Downloader};

/// A recorded download attempt for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    pub identifier: String,
    pub success: bool,
}

/// Mock implementation of the Downloader trait.
///
/// By default every download succeeds and writes a small file named after
/// the identifier into the media directory.
#[derive(Debug)]
pub struct MockDownloader {
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    panicking: Arc<RwLock<HashSet<String>>>,
    /// Size of the file written per successful download; `None` writes nothing.
    file_size: Arc<RwLock<Option<usize>>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    pub fn new() -> Self {
        Self {
            downloads: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            panicking: Arc::new(RwLock::new(HashSet::new())),
            file_size: Arc::new(RwLock::new(Some(16))),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Make downloads of `identifier` fail with a non-zero exit.
    pub async fn fail_on(&self, identifier: impl Into<String>) {
        self.failing.write().await.insert(identifier.into());
    }

    /// Make the download of `identifier` panic, simulating a crash mid-run.
    pub async fn panic_on(&self, identifier: impl Into<String>) {
        self.panicking.write().await.insert(identifier.into());
    }

    pub async fn set_file_size(&self, size: Option<usize>) {
        *self.file_size.write().await = size;
    }

    /// Set the simulated download duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded downloads.
    pub async fn recorded_downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }

    /// Identifiers downloaded successfully, in call order.
    pub async fn downloaded(&self) -> Vec<String> {
        self.downloads
            .read()
            .await
            .iter()
            .filter(|d| d.success)
            .map(|d| d.identifier.clone())
            .collect()
    }

    /// File name a successful download of `identifier` produces.
    pub fn file_name_for(identifier: &str) -> String {
        let slug: String = identifier
            .rsplit('/')
            .next()
            .unwrap_or(identifier)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}.opus", slug)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(&self, identifier: &str, media_dir: &Path) -> Result<(), DownloadError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.panicking.read().await.contains(identifier) {
            panic!("mock downloader crashed on {}", identifier);
        }

        if self.failing.read().await.contains(identifier) {
            self.downloads.write().await.push(RecordedDownload {
                identifier: identifier.to_string(),
                success: false,
            });
            return Err(DownloadError::failed(
                identifier,
                Some(1),
                Some("ERROR: mock failure".to_string()),
            ));
        }

        if let Some(size) = *self.file_size.read().await {
            let path = media_dir.join(Self::file_name_for(identifier));
            tokio::fs::write(&path, vec![0u8; size]).await?;
        }

        self.downloads.write().await.push(RecordedDownload {
            identifier: identifier.to_string(),
            success: true,
        });
        Ok(())
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        Ok(())
    }
}
