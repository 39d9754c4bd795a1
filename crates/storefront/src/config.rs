//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KEDAI_API_URL` - Base URL of the storefront REST backend
//!
//! ## Optional
//! - `KEDAI_STORAGE_DIR` - Directory for the on-device key/value store (default: .kedai)
//! - `KEDAI_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 15)
//! - `KEDAI_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".kedai";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST backend settings
    pub api: ApiConfig,
    /// Directory backing [`crate::storage::FileStorage`]
    pub storage_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; always ends with `/` so relative endpoint paths join under it
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Create a config for `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("KEDAI_API_URL", base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        })
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = var("KEDAI_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("KEDAI_API_URL".to_string()))?;
        let base_url = parse_base_url("KEDAI_API_URL", &raw_url)?;

        let request_timeout = Duration::from_secs(parse_secs(
            "KEDAI_REQUEST_TIMEOUT_SECS",
            var("KEDAI_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let catalog_cache_ttl = Duration::from_secs(parse_secs(
            "KEDAI_CATALOG_CACHE_TTL_SECS",
            var("KEDAI_CATALOG_CACHE_TTL_SECS"),
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);

        let storage_dir = var("KEDAI_STORAGE_DIR")
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout,
                catalog_cache_ttl,
            },
            storage_dir,
            sentry_dsn: var("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: var("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalize the backend base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    // Url::join replaces the last path segment unless the base ends with '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse a whole number of seconds, falling back to `default` when unset.
fn parse_secs(key: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
