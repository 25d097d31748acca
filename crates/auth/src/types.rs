//! Identity and session types
//!
//! Shapes of the user profile returned by the remote user service and of the
//! session record persisted client-side.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Application role.
///
/// Closed set: adding a role means adding an arm to every exhaustive `match`,
/// including the permission table in `permissions.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Coach,
    User,
}

impl Role {
    /// Every role, in descending order of privilege
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Coach, Role::User];

    /// Check if this role can perform admin actions
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Parse role from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "coach" => Ok(Role::Coach),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Staff => write!(f, "staff"),
            Role::Coach => write!(f, "coach"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Profile of the signed-in user, as returned by the remote login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The durably stored pair of current credential and user profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user: UserProfile,
}

/// Accept ids as JSON strings (object ids) or integers (demo accounts).
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
