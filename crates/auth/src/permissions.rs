//! Static role to capability table

use crate::types::Role;

/// Capability that grants every other capability
pub const ALL: &str = "all";

impl Role {
    /// Capabilities a new account of this role is seeded with.
    ///
    /// Authorization reads the profile's own list, never this table.
    pub fn default_permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &[ALL],
            Role::Staff => &["customer", "subscription", "feedback", "gymroom", "device"],
            Role::Coach => &["clients", "schedule", "programs", "progress"],
            Role::User => &["dashboard", "schedule", "progress", "profile"],
        }
    }
}
