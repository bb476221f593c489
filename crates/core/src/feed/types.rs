//! Types for the feed module.

use serde::{Deserialize, Serialize};

/// One entry of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Human-readable title, used only for logging.
    pub title: String,
    /// Canonical URL of the item. Compared by exact string equality.
    pub identifier: String,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            identifier: identifier.into(),
        }
    }
}
