pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use self::validation::validate_config;
use crate::poll::PollOptions;
use crate::stream::sse::{LineFraming, ReaderOptions, DEFAULT_MAX_LINE_BYTES};

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

/// Upstream stream reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub framing: LineFraming,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            framing: LineFraming::Sse,
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            framing: self.framing,
            max_line_bytes: self.max_line_bytes,
        }
    }
}

/// Job status poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_interval_ms() -> u64 {
    2_000
}
fn default_timeout_secs() -> u64 {
    600
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: default_timeout_secs(),
            max_attempts: None,
        }
    }
}

impl PollerConfig {
    #[must_use]
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
        }
    }
}

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

impl GatewayConfig {
    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] when parsing fails or
    /// [`ConfigError::Validation`] when semantic validation fails.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        // An empty document is a config with every section defaulted.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GatewayConfig = serde_yaml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Load configuration from a YAML file and validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<GatewayConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    GatewayConfig::from_yaml_str(&contents)
}
