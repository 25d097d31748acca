//! Remote user service contract
//!
//! The orchestrator talks to the user service only through [`AuthService`].
//! Implementations live in `gymdesk-gateway` (HTTP and mock).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserProfile;

/// Transport-level failure talking to the user service.
///
/// A rejected login is not a `ServiceError`; it is a `LoginResponse`
/// with `success: false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("auth service request error: {0}")]
    Request(String),

    #[error("auth service response error: {0}")]
    Response(String),
}

/// Result of a login or refresh call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    /// A rejection carrying the server's message
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// New account details
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Result of a register call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Remote user service
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verify an email-or-username and password, issuing a credential on success
    async fn login(&self, identifier: &str, password: &str)
        -> Result<LoginResponse, ServiceError>;

    /// Exchange a still-valid credential for a fresh one
    async fn refresh(&self, token: &str) -> Result<LoginResponse, ServiceError>;

    /// Best-effort notification that the client signed out
    async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError>;

    async fn register(&self, request: &RegisterRequest)
        -> Result<RegisterResponse, ServiceError>;
}
