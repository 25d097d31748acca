//! Credential claims types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{deserialize_id, Role, UserProfile};

/// Fixed header segment of every credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for CredentialHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Payload segment of a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Email
    pub email: String,
    /// Role at issue time
    pub role: Role,
    /// Expires at (Unix epoch milliseconds)
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for `user` expiring `ttl` from now
    pub fn new(user: &UserProfile, ttl: Duration) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + ttl).timestamp_millis(),
        }
    }

    /// Expiry as an instant, if representable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exp)
    }

    /// Strictly past `now`; a credential expiring this very millisecond is still valid
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp_millis()
    }
}
