//! Login, logout and refresh orchestration
//!
//! `Authenticator` is the single writer of the session store. It drives the
//! state machine in `state.rs` around each remote call:
//! - one login or refresh at a time; a second one is rejected
//! - logout is always accepted and bumps an epoch, so a call that was in
//!   flight when the user signed out cannot resurrect the session
//! - every failure clears the store before it is returned

use std::sync::{Arc, Mutex, MutexGuard};

use crate::claims::TokenClaims;
use crate::codec;
use crate::context::{self, AuthContext};
use crate::error::AuthError;
use crate::service::{AuthService, LoginResponse, RegisterRequest, RegisterResponse};
use crate::session::SessionStore;
use crate::state::{AuthEvent, AuthState, AuthStateMachine};
use crate::types::{SessionRecord, UserProfile};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Default)]
struct Inner {
    state: AuthState,
    epoch: u64,
}

/// Session owner for one running application.
///
/// Share it behind an `Arc`; there is no global instance.
pub struct Authenticator {
    service: Arc<dyn AuthService>,
    session: SessionStore,
    inner: Mutex<Inner>,
}

impl Authenticator {
    /// Resume from whatever the store holds.
    ///
    /// A stored session that is expired or unreadable is cleared.
    pub fn new(service: Arc<dyn AuthService>, session: SessionStore) -> Self {
        let state = match session.try_get() {
            Ok(Some(record)) => match codec::decode(&record.token) {
                Ok(claims) => {
                    tracing::info!(user_id = %claims.id, role = %claims.role, "Resumed stored session");
                    AuthState::Authenticated
                }
                Err(e) => {
                    tracing::info!(code = e.code(), "Stored credential no longer valid, clearing");
                    discard(&session);
                    AuthState::Anonymous
                }
            },
            Ok(None) => AuthState::Anonymous,
            Err(AuthError::StorageCorrupt) => {
                discard(&session);
                AuthState::Anonymous
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session storage unavailable at startup");
                AuthState::Anonymous
            }
        };

        Self {
            service,
            session,
            inner: Mutex::new(Inner { state, epoch: 0 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner holds plain data; a panic elsewhere cannot leave it half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> AuthState {
        self.lock().state
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Sign in with an email or username.
    ///
    /// On any failure the store is cleared and the state is `Error`.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<SessionRecord, AuthError> {
        let epoch = self.begin()?;
        tracing::debug!(identifier = %identifier, "Login started");

        let outcome = match self.service.login(identifier, password).await {
            Ok(response) => accept(response, None),
            Err(e) => {
                tracing::warn!(error = %e, "Auth service unreachable during login");
                Err(e.into())
            }
        };

        let record = self.finish(epoch, outcome)?;
        tracing::info!(user_id = %record.user.id, role = %record.user.role, "Login succeeded");
        Ok(record)
    }

    /// Sign out locally, then tell the remote service.
    ///
    /// The remote notification is best-effort; only a local storage failure
    /// is reported.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let token = self.session.token();

        let cleared = {
            let mut inner = self.lock();
            inner.epoch += 1;
            inner.state =
                AuthStateMachine::transition(inner.state, AuthEvent::Logout).unwrap_or_default();
            self.session.clear()
        };

        if let Err(e) = self.service.logout(token.as_deref()).await {
            tracing::warn!(error = %e, "Remote logout notification failed");
        }

        tracing::info!("Logged out");
        cleared
    }

    /// Exchange the stored credential for a fresh one.
    ///
    /// Uses the server-issued credential only; no password is kept client-side.
    pub async fn refresh_token(&self) -> Result<String, AuthError> {
        let (epoch, current) = self.begin_refresh()?;
        tracing::debug!(user_id = %current.user.id, "Refresh started");

        let outcome = match self.service.refresh(&current.token).await {
            Ok(response) => accept(response, Some(current.user)),
            Err(e) => {
                tracing::warn!(error = %e, "Auth service unreachable during refresh");
                Err(e.into())
            }
        };

        let record = self.finish(epoch, outcome)?;
        tracing::info!(user_id = %record.user.id, "Credential refreshed");
        Ok(record.token)
    }

    /// Create an account. The current session, if any, is left alone.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AuthError> {
        let response = self.service.register(request).await?;

        if !response.success {
            return Err(AuthError::RemoteAuthFailure {
                message: response
                    .message
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
            });
        }

        tracing::info!(username = %request.username, "Account registered");
        Ok(response)
    }

    /// Stored user, no network and no expiry check
    pub fn get_current_user(&self) -> Option<UserProfile> {
        self.session.get().map(|record| record.user)
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// True iff a token is stored
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Claims of the stored credential.
    ///
    /// An expired or malformed credential ends the session here.
    pub fn current_claims(&self) -> Option<TokenClaims> {
        let token = self.session.token()?;

        match codec::decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                self.end_stale(&e);
                None
            }
        }
    }

    /// End the session if its stored credential is expired or malformed.
    ///
    /// Returns true if a session was ended.
    pub fn end_if_expired(&self) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };

        match codec::decode(&token) {
            Ok(_) => false,
            Err(e) => {
                self.end_stale(&e);
                true
            }
        }
    }

    pub fn current_context(&self) -> Option<AuthContext> {
        self.get_current_user().map(AuthContext::new)
    }

    /// Whether the current user holds `capability`
    pub fn has_permission(&self, capability: &str) -> bool {
        context::has_permission(self.get_current_user().as_ref(), capability)
    }

    /// Enter `Authenticating`, returning the epoch the call belongs to
    fn begin(&self) -> Result<u64, AuthError> {
        let mut inner = self.lock();
        inner.state = AuthStateMachine::transition(inner.state, AuthEvent::Submit).map_err(|e| {
            tracing::debug!(error = %e, "Rejected concurrent login");
            AuthError::LoginInProgress
        })?;
        Ok(inner.epoch)
    }

    /// Enter `Authenticating` for a refresh.
    ///
    /// The stored session and the epoch are read under one lock, so a logout
    /// cannot slip between them and have its session written back.
    fn begin_refresh(&self) -> Result<(u64, SessionRecord), AuthError> {
        let mut inner = self.lock();

        let Some(current) = self.session.get() else {
            discard(&self.session);
            if let Ok(next) = AuthStateMachine::transition(inner.state, AuthEvent::Expire) {
                inner.state = next;
            }
            return Err(AuthError::NoActiveSession);
        };

        inner.state = AuthStateMachine::transition(inner.state, AuthEvent::Submit).map_err(|e| {
            tracing::debug!(error = %e, "Rejected concurrent refresh");
            AuthError::LoginInProgress
        })?;
        Ok((inner.epoch, current))
    }

    /// Apply the outcome of a remote call started at `epoch`
    fn finish(
        &self,
        epoch: u64,
        outcome: Result<(String, UserProfile), AuthError>,
    ) -> Result<SessionRecord, AuthError> {
        let mut inner = self.lock();

        let superseded = inner.epoch != epoch
            || !AuthStateMachine::can_transition(inner.state, AuthEvent::Accept);
        if superseded {
            tracing::info!(state = %inner.state, "Discarding auth result that completed after logout");
            return Err(AuthError::SessionCancelled);
        }

        let persisted = outcome.and_then(|(token, user)| {
            self.session.set(&token, &user)?;
            Ok(SessionRecord { token, user })
        });

        let event = match &persisted {
            Ok(_) => AuthEvent::Accept,
            Err(e) => {
                discard(&self.session);
                tracing::warn!(code = e.code(), error = %e, "Authentication failed");
                AuthEvent::Reject
            }
        };
        // Still Authenticating: checked above under the same lock
        inner.state = AuthStateMachine::transition(inner.state, event).unwrap_or(AuthState::Error);

        persisted
    }

    fn end_stale(&self, reason: &AuthError) {
        tracing::info!(code = reason.code(), "Stored credential rejected, ending session");

        let mut inner = self.lock();
        discard(&self.session);
        if let Ok(next) = AuthStateMachine::transition(inner.state, AuthEvent::Expire) {
            inner.state = next;
        }
    }
}

impl std::fmt::Debug for Authenticator {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Turn a login or refresh response into a session to persist
fn accept(
    response: LoginResponse,
    fallback_user: Option<UserProfile>,
) -> Result<(String, UserProfile), AuthError> {
    let LoginResponse {
        success,
        token,
        user,
        message,
    } = response;

    let rejected = || AuthError::RemoteAuthFailure {
        message: message.clone().unwrap_or_else(|| LOGIN_FAILED.to_string()),
    };

    if !success {
        return Err(rejected());
    }

    let (Some(token), Some(user)) = (token, user.or(fallback_user)) else {
        tracing::warn!("Auth service reported success without token or user");
        return Err(rejected());
    };

    let claims = codec::decode(&token)?;
    if claims.id != user.id {
        tracing::warn!(claims_id = %claims.id, user_id = %user.id, "Credential subject differs from profile");
    }

    Ok((token, user))
}

fn discard(session: &SessionStore) {
    if let Err(e) = session.clear() {
        tracing::error!(error = %e, "Failed to clear session");
    }
}
