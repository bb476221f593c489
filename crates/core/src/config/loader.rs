use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides. Nested keys are separated by `__`,
/// e.g. `STASHCAST_LIMITS__MAX_SIZE_BYTES`.
pub const ENV_PREFIX: &str = "STASHCAST_";

/// Layers a config file under `STASHCAST_*` environment overrides.
///
/// `STASHCAST_CONFIG` names the file itself and is not a config key.
fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::path::PathBuf;

    const CONFIG: &str = r#"
[[subscriptions]]
channel_id = "UCabc"

[limits]
max_age_days = 3
max_size_bytes = 5000

[media]
dir = "/srv/radio"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(CONFIG).unwrap();
        assert_eq!(config.subscriptions.len(), 1);
        assert_eq!(config.limits.max_size_bytes, Some(5000));
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[limits]
max_size_bytes = "lots"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config(Path::new("/nonexistent/stashcast.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file("stashcast.toml", CONFIG)?;

            let config = load_config(Path::new("stashcast.toml")).unwrap();
            assert_eq!(config.subscriptions[0].channel_id.as_deref(), Some("UCabc"));
            assert_eq!(config.limits.max_age_days, Some(3.0));
            assert_eq!(config.state_path(), PathBuf::from("/srv/radio/.stashcast.state"));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("stashcast.toml", CONFIG)?;
            jail.set_env("STASHCAST_LIMITS__MAX_SIZE_BYTES", "2048");
            jail.set_env("STASHCAST_MEDIA__HIDDEN_PREFIX", "_");
            jail.set_env("STASHCAST_STATE__KEEP_ON_FEED_FAILURE", "true");

            let config = load_config(Path::new("stashcast.toml")).unwrap();
            assert_eq!(config.limits.max_size_bytes, Some(2048));
            // Keys without an override keep the file value
            assert_eq!(config.limits.max_age_days, Some(3.0));
            assert_eq!(config.media.hidden_prefix, "_");
            assert_eq!(config.media.dir, PathBuf::from("/srv/radio"));
            assert!(config.state.keep_on_feed_failure);
            Ok(())
        });
    }

    #[test]
    fn test_config_path_variable_is_not_a_key() {
        Jail::expect_with(|jail| {
            jail.create_file("stashcast.toml", CONFIG)?;
            jail.set_env("STASHCAST_CONFIG", "stashcast.toml");

            assert!(load_config(Path::new("stashcast.toml")).is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_env_override_with_bad_type_fails() {
        Jail::expect_with(|jail| {
            jail.create_file("stashcast.toml", CONFIG)?;
            jail.set_env("STASHCAST_LIMITS__MAX_SIZE_BYTES", "lots");

            let err = load_config(Path::new("stashcast.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError(_)));
            Ok(())
        });
    }
}
