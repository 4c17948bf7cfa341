//! Configuration management for citegraph services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/<env>, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Bibliographic API endpoint
    pub api: ApiConfig,

    /// HTTP client retry and rate-limit settings
    pub client: ClientConfig,

    /// Citation collection settings
    pub collection: CollectionConfig,

    /// Persisted output settings
    pub output: OutputConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Works endpoint of the bibliographic source
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Maximum attempts per request (>= 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between requests in seconds (> 0)
    #[serde(default = "default_delay")]
    pub delay_secs: f64,

    /// Per-request socket timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionConfig {
    /// Queries to collect, run sequentially
    #[serde(default)]
    pub queries: Vec<String>,

    /// Target number of citers per query
    #[serde(default = "default_max_citations")]
    pub max_citations: usize,

    /// Page size for search and citation listing
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Reconstruct abstracts from the inverted index
    #[serde(default = "default_include_abstracts")]
    pub include_abstracts: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path of the persisted collection document
    #[serde(default = "default_output_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_base_url() -> String { "https://api.openalex.org/works".to_string() }
fn default_max_retries() -> u32 { 3 }
fn default_delay() -> f64 { 1.0 }
fn default_timeout() -> u64 { 30 }
fn default_max_citations() -> usize { 100 }
fn default_per_page() -> u32 { crate::DEFAULT_PER_PAGE }
fn default_include_abstracts() -> bool { false }
fn default_output_path() -> String { "data/citations.json".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("api.base_url", default_base_url())?
            .set_default("client.max_retries", default_max_retries() as i64)?
            .set_default("client.delay_secs", default_delay())?
            .set_default("client.timeout_secs", default_timeout() as i64)?
            .set_default("collection.queries", Vec::<String>::new())?
            .set_default("collection.max_citations", default_max_citations() as i64)?
            .set_default("collection.per_page", default_per_page() as i64)?
            .set_default("collection.include_abstracts", default_include_abstracts())?
            .set_default("output.path", default_output_path())?
            .set_default("observability.log_level", default_log_level())?
            .set_default("observability.json_logging", default_json_logging())?
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__CLIENT__MAX_RETRIES=5
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the per-request socket timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs)
    }

    /// Get the base inter-request delay as Duration
    pub fn rate_delay(&self) -> Duration {
        Duration::from_secs_f64(self.client.delay_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
            },
            client: ClientConfig {
                max_retries: default_max_retries(),
                delay_secs: default_delay(),
                timeout_secs: default_timeout(),
            },
            collection: CollectionConfig {
                queries: Vec::new(),
                max_citations: default_max_citations(),
                per_page: default_per_page(),
                include_abstracts: default_include_abstracts(),
            },
            output: OutputConfig {
                path: default_output_path(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.client.max_retries, 3);
        assert_eq!(config.collection.per_page, 25);
        assert_eq!(config.api.base_url, "https://api.openalex.org/works");
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_delay(), Duration::from_secs(1));
    }
}
