//! Trait definitions for the feed module.

use async_trait::async_trait;

use super::error::FetchError;
use super::types::FeedEntry;

/// Fetches the entries of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches the feed at `url`, returning entries in feed order.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError>;
}
