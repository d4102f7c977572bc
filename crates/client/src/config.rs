//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIRANA_API_URL` - Base URL of the store API, including the version
//!   prefix (e.g., `http://localhost:8082/api/v1`)
//!
//! ## Optional
//! - `KIRANA_SESSION_FILE` - Path of the persisted session file
//!   (default: `kirana-session.json`)
//! - `KIRANA_SEARCH_DEBOUNCE_MS` - Debounce window for live search in
//!   milliseconds (default: 500)
//! - `KIRANA_HTTP_TIMEOUT_SECS` - Timeout for store API calls in seconds
//!   (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    /// An environment variable is set but cannot be parsed.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Kirana client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the store API. Always ends with a trailing slash so that
    /// relative endpoint paths join under it instead of replacing its last
    /// segment.
    pub api_url: Url,
    /// Where the session file lives.
    pub session_file: PathBuf,
    /// Debounce window for keystroke-triggered search.
    pub search_debounce: Duration,
    /// Timeout applied to every store API call.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `KIRANA_API_URL` is missing or unparseable,
    /// or if an optional variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("KIRANA_API_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("KIRANA_API_URL".to_owned(), e))?;
        let session_file =
            PathBuf::from(get_env_or_default("KIRANA_SESSION_FILE", "kirana-session.json"));
        let search_debounce = Duration::from_millis(parse_env_number(
            "KIRANA_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let http_timeout = Duration::from_secs(parse_env_number(
            "KIRANA_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        Ok(Self {
            api_url,
            session_file,
            search_debounce,
            http_timeout,
        })
    }
}

/// Default debounce window for live search, in milliseconds.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Default store API timeout, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get a numeric environment variable with a default value.
fn parse_env_number(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse the API base URL, normalizing it to end with a trailing slash.
///
/// `Url::join` replaces the last path segment when the base lacks a trailing
/// slash, which would turn `/api/v1` + `products` into `/api/products`.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("cannot be used as a base URL: {raw}"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
