//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Which implementation answers login/logout/register calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Remote user service over HTTP
    Http,
    /// In-process demo accounts
    Mock,
}

impl std::str::FromStr for AuthProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(AuthProvider::Http),
            "mock" => Ok(AuthProvider::Mock),
            other => Err(Error::Configuration(format!(
                "Unknown AUTH_PROVIDER: {}. Supported providers: http, mock",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthProvider::Http => write!(f, "http"),
            AuthProvider::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote user service selection
    pub auth_provider: AuthProvider,
    pub auth_api_base_url: String,
    pub auth_request_timeout_secs: u64,

    /// Durable client-side session file
    pub session_store_path: PathBuf,

    /// Lifetime of locally issued credentials (mock provider)
    pub token_ttl_hours: i64,

    /// Runtime configuration
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_provider: AuthProvider::Mock,
            auth_api_base_url: "http://localhost:3000".to_string(),
            auth_request_timeout_secs: 10,
            session_store_path: PathBuf::from(".gymdesk/session.json"),
            token_ttl_hours: 24,
            rust_log: "gymdesk=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let auth_provider = match env::var("AUTH_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.auth_provider,
        };

        let auth_api_base_url =
            env::var("AUTH_API_BASE_URL").unwrap_or(defaults.auth_api_base_url);

        if auth_provider == AuthProvider::Http && auth_api_base_url.trim().is_empty() {
            return Err(Error::Configuration(
                "AUTH_API_BASE_URL is required for the http provider".to_string(),
            ));
        }

        let auth_request_timeout_secs = parse_var(
            "AUTH_REQUEST_TIMEOUT_SECS",
            defaults.auth_request_timeout_secs,
        )?;

        let token_ttl_hours = parse_var("TOKEN_TTL_HOURS", defaults.token_ttl_hours)?;
        if token_ttl_hours <= 0 {
            return Err(Error::Configuration(
                "TOKEN_TTL_HOURS must be positive".to_string(),
            ));
        }

        let config = Self {
            auth_provider,
            auth_api_base_url,
            auth_request_timeout_secs,
            session_store_path: env::var("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_store_path),
            token_ttl_hours,
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };

        tracing::debug!(
            provider = %config.auth_provider,
            session_store = %config.session_store_path.display(),
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Configuration(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
