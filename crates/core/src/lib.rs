pub mod config;
pub mod downloader;
pub mod feed;
pub mod ingest;
pub mod retention;
pub mod scheduler;
pub mod seen;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
    SubscriptionDescriptor,
};
pub use downloader::{DownloadError, Downloader, ProcessDownloader};
pub use feed::{
    parse_feed, resolve_feed_url, resolve_feed_urls, FeedEntry, FeedFetcher, FetchError,
    HttpFeedFetcher,
};
pub use ingest::{IngestError, IngestRunner, RunOptions, RunReport};
pub use retention::{
    FsMediaDirectory, MediaDirectory, MediaFile, RetentionEngine, RetentionError,
    RetentionPolicy, RetentionReport,
};
pub use scheduler::{Scheduler, SchedulerError, SchedulerStatus};
pub use seen::{DedupSession, FileSeenStore, SeenError, SeenSet, SeenStore, SessionSummary};
