//! Configuration management for seller-sync
//!
//! This module handles loading, parsing, and validating application
//! configuration from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Upstream provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Rate limiting for the primary provider
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Bulk synchronization pacing and retry parameters
    #[serde(default)]
    pub sync: SyncConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // First, expand environment variables in the YAML string
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix SELLER_SYNC_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("SELLER_SYNC_RECEITA_WS_URL") {
            config.providers.receita_ws.base_url = url;
        }
        if let Ok(token) = std::env::var("SELLER_SYNC_RECEITA_WS_TOKEN") {
            config.providers.receita_ws.api_token = Some(token);
        }
        if let Ok(url) = std::env::var("SELLER_SYNC_BRASIL_API_URL") {
            config.providers.brasil_api.base_url = url;
        }
        if let Ok(path) = std::env::var("SELLER_SYNC_DATABASE_PATH") {
            config.database.path = path;
        }
        if let Ok(level) = std::env::var("SELLER_SYNC_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(max) = std::env::var("SELLER_SYNC_RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit.max_requests = max
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid rate limit quota".to_string()))?;
        }

        Ok(config)
    }
}

/// Configuration for both upstream providers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersConfig {
    /// ReceitaWS, the primary source
    #[serde(default = "default_receita_ws")]
    pub receita_ws: ProviderConfig,

    /// BrasilAPI, the fallback source
    #[serde(default = "default_brasil_api")]
    pub brasil_api: ProviderConfig,
}

/// Configuration for a single upstream provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional API token, sent as a bearer credential
    pub api_token: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            receita_ws: default_receita_ws(),
            brasil_api: default_brasil_api(),
        }
    }
}

fn default_receita_ws() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://receitaws.com.br".to_string(),
        timeout_secs: default_timeout(),
        api_token: None,
    }
}

fn default_brasil_api() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://brasilapi.com.br/api".to_string(),
        timeout_secs: default_timeout(),
        api_token: None,
    }
}

fn default_timeout() -> u64 {
    30
}

/// Fixed-window quota for the primary provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

/// Bulk synchronization parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Chunk size for full-sync runs
    #[serde(default = "default_full_batch_size")]
    pub full_batch_size: usize,

    /// Chunk size for remaining-only runs
    #[serde(default = "default_remaining_batch_size")]
    pub remaining_batch_size: usize,

    /// Delay between items within a chunk, in seconds
    #[serde(default = "default_item_delay")]
    pub item_delay_secs: u64,

    /// Delay between chunks, in seconds
    #[serde(default = "default_batch_delay")]
    pub batch_delay_secs: u64,

    /// Delay before retrying a transient per-item failure, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Maximum attempts per item, counting the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            full_batch_size: default_full_batch_size(),
            remaining_batch_size: default_remaining_batch_size(),
            item_delay_secs: default_item_delay(),
            batch_delay_secs: default_batch_delay(),
            retry_delay_secs: default_retry_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_full_batch_size() -> usize {
    60
}

fn default_remaining_batch_size() -> usize {
    100
}

fn default_item_delay() -> u64 {
    1
}

fn default_batch_delay() -> u64 {
    5
}

fn default_retry_delay() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "/data/db/seller-sync.db".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
