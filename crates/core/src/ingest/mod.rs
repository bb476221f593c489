//! Ingestion: one complete run from subscriptions to a trimmed media directory.
//!
//! A run resolves every subscription, fetches each feed, downloads entries
//! the dedup session has not seen, closes the session, then applies the
//! retention policy. Failures of a single feed, item or file are reported in
//! the [`RunReport`] and never stop the rest of the run.

mod error;
mod runner;
mod types;

pub use error::IngestError;
pub use runner::IngestRunner;
pub use types::{DownloadFailure, FeedFailure, RunOptions, RunReport};
