//! Session state machine
//!
//! Defines the valid states of the authentication orchestrator, the events
//! that move between them, and the transition table.

use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid transition: cannot apply {event} in state {from}")]
    InvalidTransition { from: String, event: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Events that trigger session state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A login or refresh call was sent
    Submit,
    /// The remote service issued a credential
    Accept,
    /// The remote service rejected the attempt or could not be reached
    Reject,
    /// The user signed out
    Logout,
    /// The stored credential was found expired or unreadable
    Expire,
}

impl std::fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit => write!(f, "submit"),
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Logout => write!(f, "logout"),
            Self::Expire => write!(f, "expire"),
        }
    }
}

/// Session state machine
pub struct AuthStateMachine;

impl AuthStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(current: AuthState, event: AuthEvent) -> Result<AuthState, StateError> {
        let next = match (current, event) {
            // Logout always wins
            (_, AuthEvent::Logout) => AuthState::Anonymous,

            (
                AuthState::Anonymous | AuthState::Authenticated | AuthState::Error,
                AuthEvent::Submit,
            ) => AuthState::Authenticating,

            (AuthState::Authenticating, AuthEvent::Accept) => AuthState::Authenticated,
            (AuthState::Authenticating, AuthEvent::Reject) => AuthState::Error,

            (AuthState::Authenticated | AuthState::Error, AuthEvent::Expire) => {
                AuthState::Anonymous
            }

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: AuthState, event: AuthEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
