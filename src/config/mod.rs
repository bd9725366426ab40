//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::models::MatchBuckets;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll cycles.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Result-count bound for the questions feed.
    #[serde(default = "default_question_limit")]
    pub question_limit: u32,

    /// Which match buckets to show.
    #[serde(default)]
    pub match_buckets: MatchBuckets,
}

fn default_interval() -> u64 {
    15
}

fn default_question_limit() -> u32 {
    20
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            question_limit: default_question_limit(),
            match_buckets: MatchBuckets::default(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("trivia-dash/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trivia backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            log_level: default_log_level(),
            poll: PollConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::ValidationError(format!("base_url: {}", e)))?;

        if self.poll.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.client.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Client timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
