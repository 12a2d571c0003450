use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::VisualAxis;
use crate::services::MAX_EXPLORED_AXES;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Backend base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid backend base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid {0}: must be greater than 0")]
    ZeroDuration(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid exploration axes: {0}")]
    InvalidAxes(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .adloop/config.yaml (project config)
    /// 3. .adloop/local.yaml (local overrides, optional)
    /// 4. Environment variables (ADLOOP_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(None)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Self::figment(Some(path))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = match file {
            Some(path) => figment.merge(Yaml::file(path)),
            None => figment
                .merge(Yaml::file(".adloop/config.yaml"))
                .merge(Yaml::file(".adloop/local.yaml")),
        };
        figment.merge(Env::prefixed("ADLOOP_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let base_url = config.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }

        if config.backend.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("request_timeout_secs"));
        }
        if config.backend.health_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("health_timeout_ms"));
        }
        if config.backend.health_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("health_interval_secs"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Repeated names count once, as they do in the runtime selection
        let mut axes: Vec<VisualAxis> = Vec::with_capacity(config.exploration.axes.len());
        for name in &config.exploration.axes {
            let axis = name.parse::<VisualAxis>().map_err(ConfigError::InvalidAxes)?;
            if !axes.contains(&axis) {
                axes.push(axis);
            }
        }
        if axes.is_empty() || axes.len() > MAX_EXPLORED_AXES {
            return Err(ConfigError::InvalidAxes(format!(
                "expected 1 to {MAX_EXPLORED_AXES} axes, got {}",
                axes.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.health_timeout_ms, 2000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.exploration.advanced);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
backend:
  base_url: https://ads.example.com
  request_timeout_secs: 15
logging:
  level: debug
  format: json
exploration:
  advanced: true
  axes: [shot_type, camera_angle]
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.backend.base_url, "https://ads.example.com");
        assert_eq!(config.backend.request_timeout_secs, 15);
        assert_eq!(config.backend.health_interval_secs, 30);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.exploration.axes, vec!["shot_type", "camera_angle"]);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        config.backend.base_url = String::new();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptyBaseUrl)));

        config.backend.base_url = "localhost:8000".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_validate_zero_durations() {
        let mut config = Config::default();
        config.backend.health_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroDuration("health_timeout_ms"))
        ));

        let mut config = Config::default();
        config.backend.health_interval_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroDuration("health_interval_secs"))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_axes() {
        let mut config = Config::default();
        config.exploration.axes = Vec::new();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidAxes(_))));

        config.exploration.axes = ["lighting_style", "color_palette", "shot_type", "camera_angle"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidAxes(_))));

        config.exploration.axes = ["lighting_style", "lighting_style", "color_palette", "background_type"]
            .iter()
            .map(ToString::to_string)
            .collect();
        ConfigLoader::validate(&config).expect("a repeated axis counts once");

        config.exploration.axes = vec!["hue".to_string()];
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidAxes(msg)) => assert!(msg.contains("hue")),
            other => panic!("Expected InvalidAxes error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "backend:\n  base_url: http://file.example\nlogging:\n  level: warn")
            .expect("write config");
        file.flush().expect("flush config");

        temp_env::with_vars(
            [
                ("ADLOOP_BACKEND__BASE_URL", Some("http://env.example:9000")),
                ("ADLOOP_EXPLORATION__ADVANCED", Some("true")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).expect("config loads");
                assert_eq!(config.backend.base_url, "http://env.example:9000");
                assert!(config.exploration.advanced);
                assert_eq!(config.logging.level, "warn", "file value survives");
            },
        );
    }

    #[test]
    fn test_invalid_file_value_is_rejected() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "logging:\n  format: xml").expect("write config");
        file.flush().expect("flush config");

        let err = ConfigLoader::load_from_file(file.path()).expect_err("invalid format");
        assert!(err.to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().expect("temp file");
        writeln!(base_file, "logging:\n  level: info\n  format: json").expect("write base");
        base_file.flush().expect("flush base");

        let mut override_file = NamedTempFile::new().expect("temp file");
        writeln!(override_file, "logging:\n  level: debug").expect("write override");
        override_file.flush().expect("flush override");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .expect("merged config");

        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(config.logging.format, "json", "Base value should persist when not overridden");
    }
}
