//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the marketplace backend (e.g., `https://bazaar.example`)
//!
//! ## Optional (durations are whole seconds, at most one year)
//! - `BAZAAR_STALE_TIME_SECS` - How long a cached response counts as fresh (default: 30)
//! - `BAZAAR_CACHE_CAPACITY` - Maximum number of cached resources (default: 1000)
//! - `BAZAAR_CACHE_IDLE_SECS` - Evict resources nobody read for this long (default: 300)
//! - `BAZAAR_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: transport default)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STALE_TIME_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_CACHE_IDLE_SECS: u64 = 300;

/// Upper bound for every duration setting (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL. API paths are joined onto it.
    pub api_url: Url,
    /// Cache tuning.
    pub cache: CacheConfig,
    /// Per-request timeout; `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Query cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default freshness window for cached responses.
    pub stale_time: Duration,
    /// Maximum number of cached resources.
    pub capacity: u64,
    /// Resources not read for this long are evicted.
    pub idle_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(DEFAULT_STALE_TIME_SECS),
            capacity: DEFAULT_CACHE_CAPACITY,
            idle_timeout: Duration::from_secs(DEFAULT_CACHE_IDLE_SECS),
        }
    }
}

impl ClientConfig {
    /// Configuration for a backend at `api_url` with default tuning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// http(s) URL with a host.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("BAZAAR_API_URL", api_url)?,
            cache: CacheConfig::default(),
            request_timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

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

        let api_url = parse_api_url("BAZAAR_API_URL", &get_required_env("BAZAAR_API_URL")?)?;

        let cache = CacheConfig {
            stale_time: get_duration_env_or("BAZAAR_STALE_TIME_SECS", DEFAULT_STALE_TIME_SECS)?,
            capacity: get_parsed_env_or("BAZAAR_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
            idle_timeout: get_duration_env_or("BAZAAR_CACHE_IDLE_SECS", DEFAULT_CACHE_IDLE_SECS)?,
        };

        let request_timeout = get_optional_env("BAZAAR_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_duration_secs("BAZAAR_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?;

        Ok(Self {
            api_url,
            cache,
            request_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get and parse an environment variable, falling back to `default` when unset.
fn get_parsed_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a duration in whole seconds, falling back to `default_secs` when unset.
fn get_duration_env_or(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(Duration::from_secs(default_secs)), |raw| {
        parse_duration_secs(key, &raw)
    })
}

/// Parse whole seconds, rejecting values above [`MAX_DURATION_SECS`].
fn parse_duration_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = parse_value::<u64>(key, raw)?;
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{secs} seconds exceeds the maximum of {MAX_DURATION_SECS}"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse the backend URL, requiring http(s) and a host.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}
