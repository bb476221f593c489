//! Feed module: from subscriptions to `(title, identifier)` entries.
//!
//! Subscriptions are resolved to feed URLs up front (a malformed descriptor
//! is a configuration error). Fetching goes through the [`FeedFetcher`]
//! trait; [`HttpFeedFetcher`] downloads the document with reqwest and
//! [`parse_feed`] extracts entries from Atom or RSS 2.0 in document order.

mod error;
mod http;
mod parser;
mod resolve;
mod traits;
mod types;

pub use error::FetchError;
pub use http::HttpFeedFetcher;
pub use parser::parse_feed;
pub use resolve::{resolve_feed_url, resolve_feed_urls, YOUTUBE_FEED_BASE};
pub use traits::FeedFetcher;
pub use types::FeedEntry;
