//! Testing utilities and in-memory implementations of the collaborator traits.
//!
//! Lets a full ingestion run be driven without network access, an external
//! downloader binary, or a real media directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use stashcast_core::testing::{MemorySeenStore, MockDownloader, MockFeedFetcher};
//!
//! let fetcher = MockFeedFetcher::new();
//! fetcher.set_entries("https://feeds.test/a", vec![fixtures::entry("one")]).await;
//!
//! let downloader = MockDownloader::new();
//! downloader.fail_on("https://media.test/one").await;
//! ```

mod memory_media_directory;
mod memory_seen_store;
mod mock_downloader;
mod mock_feed_fetcher;

pub use memory_media_directory::MemoryMediaDirectory;
pub use memory_seen_store::MemorySeenStore;
pub use mock_downloader::{MockDownloader, RecordedDownload};
pub use mock_feed_fetcher::MockFeedFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::{Config, SubscriptionDescriptor};
    use crate::feed::FeedEntry;

    /// Identifier for a test item.
    pub fn item_url(slug: &str) -> String {
        format!("https://media.test/watch/{}", slug)
    }

    /// Feed URL for a test feed.
    pub fn feed_url(slug: &str) -> String {
        format!("https://feeds.test/{}.xml", slug)
    }

    /// A feed entry whose identifier is `item_url(slug)`.
    pub fn entry(slug: &str) -> FeedEntry {
        FeedEntry::new(format!("Episode {}", slug), item_url(slug))
    }

    /// Config subscribed to `feed_url(slug)` for each slug, rooted at `media_dir`.
    pub fn config_with_feeds(feeds: &[&str], media_dir: &Path) -> Config {
        let mut config = Config::default().with_media_dir(media_dir);
        config.subscriptions = feeds
            .iter()
            .map(|slug| SubscriptionDescriptor::feed_url(feed_url(slug)))
            .collect();
        config
    }

    /// A minimal Atom document listing `(title, link)` pairs.
    pub fn atom_feed(entries: &[(&str, &str)]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Test channel</title>
"#,
        );
        for (title, link) in entries {
            xml.push_str(&format!(
                "  <entry>\n    <title>{}</title>\n    <link rel=\"alternate\" href=\"{}\"/>\n  </entry>\n",
                title, link
            ));
        }
        xml.push_str("</feed>\n");
        xml
    }
}
