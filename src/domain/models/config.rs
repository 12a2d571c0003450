use serde::{Deserialize, Serialize};

/// Main configuration structure for Adloop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote planning/creative/scoring service
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Exploration defaults
    #[serde(default)]
    pub exploration: ExplorationConfig,
}

/// Backend service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Base URL of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for mutating calls in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for a single liveness probe in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Interval between liveness probes in seconds
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_health_timeout_ms() -> u64 {
    2000
}

const fn default_health_interval_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            health_timeout_ms: default_health_timeout_ms(),
            health_interval_secs: default_health_interval_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Exploration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExplorationConfig {
    /// Use `axes` instead of the default three axes
    #[serde(default)]
    pub advanced: bool,

    /// Axis names explored when `advanced` is set (1-3)
    #[serde(default = "default_axes")]
    pub axes: Vec<String>,
}

fn default_axes() -> Vec<String> {
    vec![
        "lighting_style".to_string(),
        "color_palette".to_string(),
        "background_type".to_string(),
    ]
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            advanced: false,
            axes: default_axes(),
        }
    }
}
