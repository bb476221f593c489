//! External-process downloader implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::config::DownloaderConfig;

use super::error::DownloadError;
use super::traits::Downloader;

/// Lines of stderr kept when a download fails.
const STDERR_TAIL_LINES: usize = 20;

/// Runs `<program> <args...> <identifier>` inside the media directory.
pub struct ProcessDownloader {
    config: DownloaderConfig,
}

impl ProcessDownloader {
    /// Creates a new downloader with the given configuration.
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Creates a downloader with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DownloaderConfig::default())
    }

    fn spawn_error(&self, e: std::io::Error) -> DownloadError {
        if e.kind() == std::io::ErrorKind::NotFound {
            DownloadError::ProgramNotFound {
                path: self.config.program.clone(),
            }
        } else {
            DownloadError::Io(e)
        }
    }
}

/// Last lines of the captured stderr, or `None` when it was silent.
fn stderr_tail(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    Some(lines[start..].join("\n"))
}

#[async_trait]
impl Downloader for ProcessDownloader {
    fn name(&self) -> &str {
        "process"
    }

    async fn download(&self, identifier: &str, media_dir: &Path) -> Result<(), DownloadError> {
        let start = Instant::now();

        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(identifier)
            .current_dir(media_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        // On timeout the child future is dropped, which kills the process.
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DownloadError::Timeout {
                    identifier: identifier.to_string(),
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            return Err(DownloadError::failed(
                identifier,
                output.status.code(),
                stderr_tail(&output.stderr),
            ));
        }

        debug!(
            identifier = identifier,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downloader finished"
        );
        Ok(())
    }

    async fn validate(&self) -> Result<(), DownloadError> {
        let status = Command::new(&self.config.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        debug!(program = ?self.config.program, code = ?status.code(), "Downloader is available");
        Ok(())
    }
}
