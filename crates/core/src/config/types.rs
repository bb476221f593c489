use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retention::RetentionPolicy;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionDescriptor>,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Retention bounds with the day count converted to a duration.
    ///
    /// An age too large to represent disables the age bound.
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age: self
                .limits
                .max_age_days
                .and_then(|days| Duration::try_from_secs_f64(days * SECONDS_PER_DAY).ok()),
            max_size: self.limits.max_size_bytes,
        }
    }

    /// Location of the persisted seen-set. Relative paths live in the media directory.
    pub fn state_path(&self) -> PathBuf {
        if self.state.path.is_absolute() {
            self.state.path.clone()
        } else {
            self.media.dir.join(&self.state.path)
        }
    }

    /// Replace the media directory (CLI override).
    pub fn with_media_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.media.dir = dir.as_ref().to_path_buf();
        self
    }
}

/// One subscribed feed. Exactly one address kind must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
}

impl SubscriptionDescriptor {
    pub fn channel_id(id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn channel_name(name: impl Into<String>) -> Self {
        Self {
            channel_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn feed_url(url: impl Into<String>) -> Self {
        Self {
            feed_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Number of address kinds present.
    pub fn address_count(&self) -> usize {
        [&self.channel_id, &self.channel_name, &self.feed_url]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

/// Retention limits for the media directory
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum age in days (fractions allowed).
    #[serde(default)]
    pub max_age_days: Option<f64>,
    /// Maximum total size of the media directory in bytes.
    #[serde(default)]
    pub max_size_bytes: Option<u64>,
}

/// Media directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_dir")]
    pub dir: PathBuf,
    /// Entries whose name starts with this prefix are never treated as media.
    #[serde(default = "default_hidden_prefix")]
    pub hidden_prefix: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: default_media_dir(),
            hidden_prefix: default_hidden_prefix(),
        }
    }
}

fn default_media_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_hidden_prefix() -> String {
    ".".to_string()
}

/// Seen-set persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
    /// Keep every previously seen identifier when a feed fails to fetch,
    /// instead of pruning to what this run confirmed.
    #[serde(default)]
    pub keep_on_feed_failure: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            keep_on_feed_failure: false,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".stashcast.state")
}

/// External downloader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloaderConfig {
    /// Program to invoke (looked up on PATH).
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Arguments placed before the item identifier.
    #[serde(default = "default_downloader_args")]
    pub args: Vec<String>,
    /// Timeout for a single download in seconds.
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_downloader_args(),
            timeout_secs: default_download_timeout(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_downloader_args() -> Vec<String> {
    [
        "--add-metadata",
        "--xattrs",
        "--match-filter",
        "!is_live",
        "--extract-audio",
        "--audio-quality",
        "0",
        "--quiet",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_download_timeout() -> u64 {
    3600 // 1 hour
}

/// Feed fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("stashcast/{}", env!("CARGO_PKG_VERSION"))
}

/// Background re-run schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Lower bound of the delay between runs.
    #[serde(default)]
    pub min_interval_secs: u64,
    /// Upper bound of the delay between runs.
    #[serde(default = "default_max_interval")]
    pub max_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 0,
            max_interval_secs: default_max_interval(),
        }
    }
}

fn default_max_interval() -> u64 {
    12 * 60 * 60 // 12 hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[[subscriptions]]
channel_id = "UC123"

[[subscriptions]]
channel_name = "somebody"

[[subscriptions]]
feed_url = "https://example.com/feed.xml"

[limits]
max_age_days = 7
max_size_bytes = 1000000

[media]
dir = "/srv/radio"

[downloader]
program = "/usr/local/bin/yt-dlp"
args = ["-x"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.subscriptions.len(), 3);
        assert_eq!(config.subscriptions[0].channel_id.as_deref(), Some("UC123"));
        assert_eq!(config.subscriptions[1].channel_name.as_deref(), Some("somebody"));
        assert_eq!(config.limits.max_age_days, Some(7.0));
        assert_eq!(config.limits.max_size_bytes, Some(1_000_000));
        assert_eq!(config.media.dir, PathBuf::from("/srv/radio"));
        assert_eq!(config.downloader.args, vec!["-x".to_string()]);
        assert_eq!(config.downloader.timeout_secs, 3600); // default
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.subscriptions.is_empty());
        assert!(config.limits.max_age_days.is_none());
        assert!(config.limits.max_size_bytes.is_none());
        assert_eq!(config.media.hidden_prefix, ".");
        assert_eq!(config.downloader.program, PathBuf::from("yt-dlp"));
        assert!(config.downloader.args.contains(&"--extract-audio".to_string()));
        assert_eq!(config.schedule.max_interval_secs, 43_200);
        assert_eq!(config.fetcher.timeout_secs, 30);
        assert!(!config.state.keep_on_feed_failure);
    }

    #[test]
    fn test_unknown_subscription_key_fails() {
        let toml = r#"
[[subscriptions]]
podcast = "nope"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_retention_policy_converts_days() {
        let mut config = Config::default();
        config.limits.max_age_days = Some(1.5);
        config.limits.max_size_bytes = Some(350);

        let policy = config.retention_policy();
        assert_eq!(policy.max_age, Some(Duration::from_secs(129_600)));
        assert_eq!(policy.max_size, Some(350));
    }

    #[test]
    fn test_state_path_relative_to_media_dir() {
        let config = Config::default().with_media_dir("/srv/radio");
        assert_eq!(
            config.state_path(),
            PathBuf::from("/srv/radio/.stashcast.state")
        );

        let mut absolute = config.clone();
        absolute.state.path = PathBuf::from("/var/lib/stashcast/state");
        assert_eq!(
            absolute.state_path(),
            PathBuf::from("/var/lib/stashcast/state")
        );
    }

    #[test]
    fn test_address_count() {
        assert_eq!(SubscriptionDescriptor::default().address_count(), 0);
        assert_eq!(SubscriptionDescriptor::channel_id("x").address_count(), 1);

        let both = SubscriptionDescriptor {
            channel_id: Some("x".to_string()),
            feed_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(both.address_count(), 2);
    }
}
