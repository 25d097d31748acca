//! GymDesk user service gateway
//!
//! Implementations of [`gymdesk_auth::AuthService`]:
//! - HTTP client for the remote user service (`/api/user/*`)
//! - Mock service backed by demo accounts for testing and development
//! - Factory selecting one from configuration

pub mod client;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use gymdesk_auth::AuthService;
use gymdesk_common::{AuthProvider, Config};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway configuration error: {0}")]
    Configuration(String),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Which implementation to build
    pub provider: AuthProvider,
    /// Base URL of the user service, without the `/api/user` suffix
    pub base_url: String,
    /// Per-request timeout for the HTTP client
    pub timeout: Duration,
    /// Lifetime of credentials issued by the mock
    pub token_ttl: chrono::Duration,
}

impl From<&Config> for GatewayConfig {
    fn from(config: &Config) -> Self {
        Self {
            provider: config.auth_provider,
            base_url: config.auth_api_base_url.clone(),
            timeout: Duration::from_secs(config.auth_request_timeout_secs),
            token_ttl: chrono::Duration::hours(config.token_ttl_hours),
        }
    }
}

/// Factory for creating AuthService implementations.
pub struct AuthServiceFactory;

impl AuthServiceFactory {
    /// Create an AuthService based on configuration.
    pub fn create(config: GatewayConfig) -> Result<Arc<dyn AuthService>, GatewayError> {
        match config.provider {
            AuthProvider::Http => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP user service client");
                if config.base_url.trim().is_empty() {
                    return Err(GatewayError::Configuration(
                        "AUTH_API_BASE_URL is required for the http provider".to_string(),
                    ));
                }
                Ok(Arc::new(client::HttpAuthService::new(&config)?))
            }
            AuthProvider::Mock => {
                tracing::info!("Creating mock user service");
                Ok(Arc::new(mock::MockAuthService::with_ttl(config.token_ttl)))
            }
        }
    }
}
