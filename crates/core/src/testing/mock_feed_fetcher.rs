//! Mock feed fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::feed::{FeedEntry, FeedFetcher, FetchError};

/// Mock implementation of the FeedFetcher trait.
///
/// Serves configured entries per URL. URLs marked as failing return a
/// connection error; unknown URLs return HTTP 404.
#[derive(Debug, Default)]
pub struct MockFeedFetcher {
    feeds: Arc<RwLock<HashMap<String, Vec<FeedEntry>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    /// URLs requested, in call order.
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entries` for `url`.
    pub async fn set_entries(&self, url: impl Into<String>, entries: Vec<FeedEntry>) {
        self.feeds.write().await.insert(url.into(), entries);
    }

    /// Make fetches of `url` fail.
    pub async fn fail_on(&self, url: impl Into<String>) {
        self.failing.write().await.insert(url.into());
    }

    /// Get all requested URLs.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl FeedFetcher for MockFeedFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        self.calls.write().await.push(url.to_string());

        if self.failing.read().await.contains(url) {
            return Err(FetchError::ConnectionFailed {
                url: url.to_string(),
                reason: "mock connection refused".to_string(),
            });
        }

        self.feeds
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
