//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPFRONT_API_URL` - Base URL of the commerce REST API (default: `http://localhost:3000`)
//! - `SHOPFRONT_DATA_DIR` - Directory holding the persisted cart and favorites
//!   (default: `<platform data dir>/shopfront`)
//! - `SHOPFRONT_CACHE_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `SHOPFRONT_CACHE_CAPACITY` - Maximum cached catalog entries (default: 1000)
//! - `SHOPFRONT_LOG_FORMAT` - `pretty` or `json` (default: `pretty`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Commerce API settings
    pub api: ApiConfig,
    /// Directory for the persisted cart and favorites blobs
    pub data_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Commerce REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
    /// Maximum number of cached catalog entries
    pub cache_capacity: u64,
}

impl ApiConfig {
    /// Build an API configuration for a base URL with default cache settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url("SHOPFRONT_API_URL", base_url)?,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if no
    /// data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let data_dir = match get_optional_env("SHOPFRONT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("shopfront"))
                .ok_or_else(|| ConfigError::MissingEnvVar("SHOPFRONT_DATA_DIR".to_string()))?,
        };
        let log_format = parse_log_format(&get_env_or_default("SHOPFRONT_LOG_FORMAT", "pretty"))?;

        Ok(Self {
            api,
            data_dir,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            "SHOPFRONT_API_URL",
            &get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL),
        )?;
        let cache_ttl = Duration::from_secs(parse_env_u64(
            "SHOPFRONT_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);
        let cache_capacity = parse_env_u64("SHOPFRONT_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        Ok(Self {
            base_url,
            cache_ttl,
            cache_capacity,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "SHOPFRONT_LOG_FORMAT".to_string(),
            format!("expected `pretty` or `json`, got `{other}`"),
        )),
    }
}

/// Validate a base URL and strip the trailing slash.
fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("X", "https://shop.example.com/").unwrap(),
            "https://shop.example.com"
        );
        assert_eq!(
            normalize_base_url("X", " http://localhost:8080/api// ").unwrap(),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("SHOPFRONT_API_URL", "not a url"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOPFRONT_API_URL"
        ));
        assert!(normalize_base_url("X", "ftp://files.example.com").is_err());
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("JSON").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format("pretty").unwrap(), LogFormat::Pretty);
        assert!(parse_log_format("xml").is_err());
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::new("http://127.0.0.1:9000/").unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cache_capacity, 1000);
    }
}
