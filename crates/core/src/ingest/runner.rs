//! Ingestion runner implementation.

use std::sync::Arc;
use std::time::SystemTime;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::downloader::{DownloadError, Downloader, ProcessDownloader};
use crate::feed::{resolve_feed_urls, FeedEntry, FeedFetcher, HttpFeedFetcher};
use crate::retention::{FsMediaDirectory, MediaDirectory, RetentionEngine};
use crate::seen::{DedupSession, FileSeenStore, SeenStore};

use super::error::IngestError;
use super::types::{DownloadFailure, FeedFailure, RunOptions, RunReport};

/// Drives one ingestion run at a time over its collaborators.
///
/// The run is strictly sequential: one feed, one download, one deletion at
/// a time. Callers that re-run it periodically must not overlap runs; see
/// [`Scheduler`](crate::scheduler::Scheduler).
pub struct IngestRunner {
    config: Config,
    fetcher: Arc<dyn FeedFetcher>,
    downloader: Arc<dyn Downloader>,
    seen_store: Arc<dyn SeenStore>,
    media: Arc<dyn MediaDirectory>,
}

impl IngestRunner {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn FeedFetcher>,
        downloader: Arc<dyn Downloader>,
        seen_store: Arc<dyn SeenStore>,
        media: Arc<dyn MediaDirectory>,
    ) -> Self {
        Self {
            config,
            fetcher,
            downloader,
            seen_store,
            media,
        }
    }

    /// Build a runner with the production collaborators: HTTP feeds, the
    /// configured downloader program, the seen-set file and the media directory
    /// on disk.
    pub fn from_config(config: Config) -> Result<Self, IngestError> {
        let fetcher = Arc::new(HttpFeedFetcher::new(&config.fetcher)?);
        let downloader = Arc::new(ProcessDownloader::new(config.downloader.clone()));
        let seen_store = Arc::new(FileSeenStore::new(config.state_path()));
        let media = Arc::new(FsMediaDirectory::from_config(&config));

        Ok(Self::new(config, fetcher, downloader, seen_store, media))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the subscriptions resolve and the downloader can be started.
    pub async fn validate(&self) -> Result<(), IngestError> {
        resolve_feed_urls(&self.config.subscriptions)?;
        self.downloader.validate().await?;
        Ok(())
    }

    /// Run once with default options.
    pub async fn run_once(&self) -> Result<RunReport, IngestError> {
        self.run(RunOptions::default()).await
    }

    /// Run once.
    ///
    /// A run that reaches the end prunes the seen-set to the identifiers its
    /// feeds listed. A dry run keeps every previously seen identifier, as
    /// does a run with a failed feed when `state.keep_on_feed_failure` is
    /// set. An unusable downloader stops the downloads early; the seen-set
    /// is then kept whole and retention still runs before the error is
    /// returned.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport, IngestError> {
        let mut report = RunReport::begin(options.dry_run);

        let feeds = resolve_feed_urls(&self.config.subscriptions)?;
        report.feeds = feeds.len();
        info!(
            feeds = feeds.len(),
            dry_run = options.dry_run,
            "Starting ingestion run"
        );

        let mut session = DedupSession::open(Arc::clone(&self.seen_store))?;
        let aborted = self
            .process_feeds(&feeds, &mut session, &mut report, options)
            .await
            .err();
        if let Some(e) = &aborted {
            error!("Downloader unavailable, aborting run: {}", e);
        }

        let keep_prior = if options.dry_run || aborted.is_some() {
            true
        } else if report.feed_failures.is_empty() {
            false
        } else if self.config.state.keep_on_feed_failure {
            warn!(
                failed = report.feed_failures.len(),
                "Some feeds failed, keeping previously seen identifiers"
            );
            true
        } else {
            warn!(
                failed = report.feed_failures.len(),
                "Some feeds failed, their identifiers will be forgotten"
            );
            false
        };
        let summary = if keep_prior {
            session.abandon()?
        } else {
            session.commit()?
        };
        report.session = Some(summary);

        if options.skip_retention {
            debug!("Retention skipped");
        } else {
            let engine = RetentionEngine::new(
                Arc::clone(&self.media),
                self.config.retention_policy(),
            )
            .with_dry_run(options.dry_run);
            match engine.enforce(SystemTime::now()) {
                Ok(retention) => report.retention = Some(retention),
                Err(e) if aborted.is_some() => error!("Retention failed: {}", e),
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(e) = aborted {
            return Err(e.into());
        }

        report.finished_at = Utc::now();
        info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped,
            failed = report.download_failures.len(),
            feed_failures = report.feed_failures.len(),
            deleted = report.retention.as_ref().map_or(0, |r| r.removed_count()),
            "Ingestion run finished"
        );
        Ok(report)
    }

    /// Fetch each feed in order and handle its entries. A failed feed is
    /// recorded and skipped.
    async fn process_feeds(
        &self,
        feeds: &[String],
        session: &mut DedupSession,
        report: &mut RunReport,
        options: RunOptions,
    ) -> Result<(), DownloadError> {
        for url in feeds {
            let entries = match self.fetcher.fetch(url).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(feed = %url, retryable = e.is_retryable(), "Failed to fetch feed: {}", e);
                    report.feed_failures.push(FeedFailure {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            report.feeds_fetched += 1;
            debug!(feed = %url, entries = entries.len(), "Fetched feed");

            for entry in &entries {
                report.entries += 1;
                self.process_entry(entry, session, report, options).await?;
            }
        }
        Ok(())
    }

    /// Handle one entry. Only an unusable downloader is returned as an error.
    async fn process_entry(
        &self,
        entry: &FeedEntry,
        session: &mut DedupSession,
        report: &mut RunReport,
        options: RunOptions,
    ) -> Result<(), DownloadError> {
        let id = entry.identifier.as_str();

        if session.has_seen(id) {
            debug!(identifier = %id, "Already seen, skipping");
            report.skipped += 1;
            // Still listed by a feed, so it survives the commit
            session.mark_seen(id);
            return Ok(());
        }

        if options.dry_run {
            if report.downloaded.iter().any(|d| d == id) {
                report.skipped += 1;
            } else {
                info!(identifier = %id, title = %entry.title, "Would download");
                report.downloaded.push(id.to_string());
            }
            return Ok(());
        }

        info!(identifier = %id, title = %entry.title, "Downloading");
        match self.downloader.download(id, &self.config.media.dir).await {
            Ok(()) => {
                session.mark_seen(id);
                report.downloaded.push(id.to_string());
                Ok(())
            }
            Err(e) if !e.is_retryable() => Err(e),
            Err(e) => {
                warn!(identifier = %id, title = %entry.title, "Download failed: {}", e);
                report.download_failures.push(DownloadFailure {
                    identifier: id.to_string(),
                    title: entry.title.clone(),
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }
}
