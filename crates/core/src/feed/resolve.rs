//! Subscription descriptor to feed URL mapping.

use crate::config::{ConfigError, SubscriptionDescriptor};

/// Base URL of YouTube channel feeds.
pub const YOUTUBE_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";

/// Resolve one descriptor. `index` is only used to label errors.
pub fn resolve_feed_url(
    index: usize,
    descriptor: &SubscriptionDescriptor,
) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSubscription {
        index,
        reason: reason.to_string(),
    };

    if descriptor.address_count() > 1 {
        return Err(invalid("only one address per subscription is allowed"));
    }

    let non_empty = |kind: &str, value: &str| -> Result<String, ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            Err(invalid(&format!("{} is empty", kind)))
        } else {
            Ok(value.to_string())
        }
    };

    if let Some(id) = &descriptor.channel_id {
        let id = non_empty("channel_id", id)?;
        Ok(format!(
            "{}?channel_id={}",
            YOUTUBE_FEED_BASE,
            urlencoding::encode(&id)
        ))
    } else if let Some(name) = &descriptor.channel_name {
        let name = non_empty("channel_name", name)?;
        Ok(format!("{}?user={}", YOUTUBE_FEED_BASE, urlencoding::encode(&name)))
    } else if let Some(url) = &descriptor.feed_url {
        non_empty("feed_url", url)
    } else {
        Err(invalid(
            "expected one of channel_id, channel_name or feed_url",
        ))
    }
}

/// Resolve every descriptor, failing on the first malformed one.
pub fn resolve_feed_urls(
    descriptors: &[SubscriptionDescriptor],
) -> Result<Vec<String>, ConfigError> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, d)| resolve_feed_url(index, d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_channel_id() {
        let url = resolve_feed_url(0, &SubscriptionDescriptor::channel_id("UC_x5XG1")).unwrap();
        assert_eq!(
            url,
            "https://www.youtube.com/feeds/videos.xml?channel_id=UC_x5XG1"
        );
    }

    #[test]
    fn test_resolve_channel_name_is_encoded() {
        let url = resolve_feed_url(0, &SubscriptionDescriptor::channel_name("a b&c")).unwrap();
        assert_eq!(url, "https://www.youtube.com/feeds/videos.xml?user=a%20b%26c");
    }

    #[test]
    fn test_resolve_feed_url_verbatim() {
        let url = resolve_feed_url(
            0,
            &SubscriptionDescriptor::feed_url("https://example.com/pod.rss?x=1"),
        )
        .unwrap();
        assert_eq!(url, "https://example.com/pod.rss?x=1");
    }

    #[test]
    fn test_resolve_rejects_zero_addresses() {
        let err = resolve_feed_url(4, &SubscriptionDescriptor::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubscription { index: 4, .. }));
    }

    #[test]
    fn test_resolve_rejects_multiple_addresses() {
        let descriptor = SubscriptionDescriptor {
            channel_id: Some("UC1".to_string()),
            channel_name: Some("name".to_string()),
            feed_url: None,
        };
        let err = resolve_feed_url(0, &descriptor).unwrap_err();
        assert!(err.to_string().contains("only one address"));
    }

    #[test]
    fn test_resolve_rejects_blank_value() {
        let err = resolve_feed_url(0, &SubscriptionDescriptor::feed_url("  ")).unwrap_err();
        assert!(err.to_string().contains("feed_url is empty"));
    }

    #[test]
    fn test_resolve_all_stops_at_first_error() {
        let descriptors = vec![
            SubscriptionDescriptor::channel_id("UC1"),
            SubscriptionDescriptor::default(),
            SubscriptionDescriptor::feed_url("https://example.com/feed"),
        ];
        let err = resolve_feed_urls(&descriptors).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubscription { index: 1, .. }));

        let ok = resolve_feed_urls(&descriptors[..1]).unwrap();
        assert_eq!(ok.len(), 1);
    }
}
