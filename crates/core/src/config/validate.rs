use super::{types::Config, ConfigError};
use crate::feed::resolve_feed_urls;

/// Validate configuration
/// Currently validates:
/// - Every subscription names exactly one non-empty address
/// - Age limit is finite and non-negative, size limit is not 0
/// - Downloader program is set
/// - Schedule bounds are ordered and the upper one is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    resolve_feed_urls(&config.subscriptions)?;

    if let Some(days) = config.limits.max_age_days {
        if !days.is_finite() || days < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_age_days must be a non-negative number, got {}",
                days
            )));
        }
    }

    if config.limits.max_size_bytes == Some(0) {
        return Err(ConfigError::ValidationError(
            "limits.max_size_bytes cannot be 0".to_string(),
        ));
    }

    if config.downloader.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "downloader.program cannot be empty".to_string(),
        ));
    }

    if config.schedule.max_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "schedule.max_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.schedule.min_interval_secs > config.schedule.max_interval_secs {
        return Err(ConfigError::ValidationError(format!(
            "schedule.min_interval_secs ({}) exceeds schedule.max_interval_secs ({})",
            config.schedule.min_interval_secs, config.schedule.max_interval_secs
        )));
    }

    Ok(())
}
