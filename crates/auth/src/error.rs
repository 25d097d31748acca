//! Authentication errors

use thiserror::Error;

use crate::service::ServiceError;
use crate::storage::StorageError;

/// Authentication error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Credential is not a well-formed token")]
    InvalidCredentialFormat,

    #[error("Credential has expired")]
    CredentialExpired,

    #[error("{message}")]
    RemoteAuthFailure { message: String },

    #[error("No active session")]
    NoActiveSession,

    #[error("Stored session is corrupt")]
    StorageCorrupt,

    #[error("A login is already in progress")]
    LoginInProgress,

    #[error("Session was cancelled by logout")]
    SessionCancelled,

    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Stable code identifying the failure kind
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentialFormat => "INVALID_CREDENTIAL_FORMAT",
            AuthError::CredentialExpired => "CREDENTIAL_EXPIRED",
            AuthError::RemoteAuthFailure { .. } => "REMOTE_AUTH_FAILURE",
            AuthError::NoActiveSession => "NO_ACTIVE_SESSION",
            AuthError::StorageCorrupt => "STORAGE_CORRUPT",
            AuthError::LoginInProgress => "LOGIN_IN_PROGRESS",
            AuthError::SessionCancelled => "SESSION_CANCELLED",
            AuthError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AuthError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether the caller should treat this as "not signed in"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentialFormat
                | AuthError::CredentialExpired
                | AuthError::NoActiveSession
                | AuthError::StorageCorrupt
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<ServiceError> for AuthError {
    fn from(err: ServiceError) -> Self {
        AuthError::ServiceUnavailable(err.to_string())
    }
}
