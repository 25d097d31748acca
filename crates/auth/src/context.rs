//! Authorization context for the signed-in user

use crate::permissions::ALL;
use crate::types::{Role, UserProfile};

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserProfile,
}

impl AuthContext {
    /// Create new auth context for a user
    pub fn new(user: UserProfile) -> Self {
        Self { user }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Check if user has a capability.
    ///
    /// Only the profile's own list counts; an empty list grants nothing.
    pub fn has_permission(&self, capability: &str) -> bool {
        permits(&self.user, capability)
    }
}

fn permits(user: &UserProfile, capability: &str) -> bool {
    // Wildcard permission allows everything
    if user.permissions.contains(ALL) {
        return true;
    }

    user.permissions.contains(capability)
}

/// Permission check over an optional current user; absent means denied
pub fn has_permission(user: Option<&UserProfile>, capability: &str) -> bool {
    match user {
        Some(user) => permits(user, capability),
        None => false,
    }
}
