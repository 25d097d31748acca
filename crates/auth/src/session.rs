//! Client-side session store
//!
//! Owns the two storage keys. Every read and write goes through one mutex so
//! a concurrent reader never observes a token without its user or the reverse.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AuthError;
use crate::storage::KeyValueStore;
use crate::types::{SessionRecord, UserProfile};

/// Storage key for the credential
pub const TOKEN_KEY: &str = "gym_token";
/// Storage key for the serialized user profile
pub const USER_KEY: &str = "gym_user";

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, AuthError> {
        self.lock
            .lock()
            .map_err(|_| AuthError::Storage("session lock poisoned".to_string()))
    }

    /// Persist token and user together.
    ///
    /// If the second write fails the first is rolled back.
    pub fn set(&self, token: &str, user: &UserProfile) -> Result<(), AuthError> {
        let serialized = serde_json::to_string(user)
            .map_err(|e| AuthError::Storage(format!("failed to serialize user: {}", e)))?;

        let _guard = self.guard()?;

        self.storage.set(USER_KEY, &serialized)?;
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            tracing::error!(error = %e, user_id = %user.id, "Failed to persist token, rolling back session");
            self.remove_both();
            return Err(e.into());
        }

        tracing::debug!(user_id = %user.id, role = %user.role, "Session stored");
        Ok(())
    }

    /// Read the session, failing closed on anything unreadable
    pub fn get(&self) -> Option<SessionRecord> {
        match self.try_get() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "Stored session unreadable, treating as signed out");
                None
            }
        }
    }

    /// Read the session, reporting why it could not be read.
    ///
    /// A token without a user (or the reverse) reads as no session.
    pub fn try_get(&self) -> Result<Option<SessionRecord>, AuthError> {
        let _guard = self.guard()?;

        let token = self.storage.get(TOKEN_KEY).map_err(corrupt_or_storage)?;
        let user = self.storage.get(USER_KEY).map_err(corrupt_or_storage)?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return Ok(None),
            _ => {
                tracing::warn!("Half-written session found, ignoring");
                return Ok(None);
            }
        };

        let user: UserProfile = serde_json::from_str(&user).map_err(|e| {
            tracing::warn!(error = %e, "Stored user profile is not valid JSON");
            AuthError::StorageCorrupt
        })?;

        Ok(Some(SessionRecord { token, user }))
    }

    /// Remove both fields
    pub fn clear(&self) -> Result<(), AuthError> {
        let _guard = self.guard()?;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// True iff a token is stored. Does not check expiry.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The stored token, if any
    pub fn token(&self) -> Option<String> {
        let _guard = self.guard().ok()?;
        self.storage.get(TOKEN_KEY).ok().flatten()
    }

    fn remove_both(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::error!(error = %e, key, "Failed to remove session key");
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

fn corrupt_or_storage(err: crate::storage::StorageError) -> AuthError {
    match err {
        crate::storage::StorageError::Corrupt(_) => AuthError::StorageCorrupt,
        other => other.into(),
    }
}
