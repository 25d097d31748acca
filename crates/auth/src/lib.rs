//! Session and authorization layer for GymDesk
//!
//! Provides the three-segment session credential codec, a durable
//! client-side session store, login/logout/refresh orchestration against
//! the remote user service, and role-based permission checks.

mod authenticator;
mod claims;
pub mod codec;
mod context;
mod error;
mod permissions;
mod service;
mod session;
mod state;
pub mod storage;
mod types;

pub use authenticator::Authenticator;
pub use claims::{CredentialHeader, TokenClaims};
pub use context::{has_permission, AuthContext};
pub use error::AuthError;
pub use permissions::ALL;
pub use service::{
    AuthService, LoginResponse, RegisterRequest, RegisterResponse, ServiceError,
};
pub use session::{SessionStore, TOKEN_KEY, USER_KEY};
pub use state::{AuthEvent, AuthState, AuthStateMachine, StateError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use types::{Role, SessionRecord, UserProfile};
