//! Configuration module for the Buddy System frontend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::invalid("WGB_LOG_FORMAT", other)),
        }
    }
}

/// Frontend configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the backend REST API, without a trailing slash
    pub api_base_url: String,
    /// Page the browser is sent to when the session is rejected
    pub login_path: String,
    /// How long a toast stays on screen
    pub toast_ttl: Duration,
    /// Idle window before a search input is dispatched
    pub search_debounce: Duration,
    /// Per-request timeout for the HTTP client
    pub request_timeout: Duration,
    /// File used to persist the session token, if any
    pub token_path: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            login_path: "/login.html".to_string(),
            toast_ttl: Duration::from_millis(5000),
            search_debounce: Duration::from_millis(300),
            request_timeout: Duration::from_secs(30),
            token_path: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let api_base_url = env::var("WGB_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let login_path = env::var("WGB_LOGIN_PATH").unwrap_or(defaults.login_path);

        let toast_ttl = duration_var("WGB_TOAST_TTL_MS", Duration::from_millis)?
            .unwrap_or(defaults.toast_ttl);

        let search_debounce = duration_var("WGB_SEARCH_DEBOUNCE_MS", Duration::from_millis)?
            .unwrap_or(defaults.search_debounce);

        let request_timeout = duration_var("WGB_REQUEST_TIMEOUT_SECS", Duration::from_secs)?
            .unwrap_or(defaults.request_timeout);

        let token_path = env::var("WGB_TOKEN_PATH").ok().map(PathBuf::from);

        let log_level = env::var("WGB_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match env::var("WGB_LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.log_format,
        };

        Ok(Self {
            api_base_url,
            login_path,
            toast_ttl,
            search_debounce,
            request_timeout,
            token_path,
            log_level,
            log_format,
        })
    }

    /// Resolve an API path against the configured backend origin.
    pub fn api_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}

fn duration_var(
    name: &'static str,
    unit: fn(u64) -> Duration,
) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|n| Some(unit(n)))
            .map_err(|_| ConfigError::invalid(name, &raw)),
        Err(_) => Ok(None),
    }
}
