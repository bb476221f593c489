//! HTTP feed fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::FetcherConfig;

use super::error::FetchError;
use super::parser::parse_feed;
use super::traits::FeedFetcher;
use super::types::FeedEntry;

/// Fetches feeds over HTTP and parses them as Atom or RSS.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Create a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(&FetcherConfig::default())
    }
}

fn map_request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::ConnectionFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        debug!(url = url, "Fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let entries = parse_feed(&body)?;
        debug!(url = url, entries = entries.len(), "Parsed feed");
        Ok(entries)
    }
}
