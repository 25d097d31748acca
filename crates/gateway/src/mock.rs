//! Mock User Service Implementation
//!
//! Serves the four demo accounts (one per role), issues codec credentials,
//! and records every call for test assertions. Logins can be scripted or
//! held open to exercise the orchestrator's concurrency rules.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gymdesk_auth::{
    codec, AuthService, LoginResponse, RegisterRequest, RegisterResponse, Role, ServiceError,
    TokenClaims, UserProfile,
};
use tokio::sync::Notify;

const INVALID_CREDENTIALS: &str = "Invalid email/username or password";

/// A call received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Login { identifier: String },
    Refresh,
    Logout { with_token: bool },
    Register { email: String },
}

struct DemoAccount {
    profile: UserProfile,
    password: String,
}

fn demo_account(
    id: &str,
    role: Role,
    name: &str,
    avatar: &str,
    permissions: &[&str],
) -> DemoAccount {
    let username = role.to_string();
    DemoAccount {
        profile: UserProfile {
            id: id.to_string(),
            email: format!("{}@gym.com", username),
            username: username.clone(),
            role,
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            avatar: Some(avatar.to_string()),
        },
        password: format!("{}123", username),
    }
}

fn seed_accounts() -> Vec<DemoAccount> {
    vec![
        demo_account(
            "1",
            Role::Admin,
            "Admin User",
            "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face",
            Role::Admin.default_permissions(),
        ),
        demo_account(
            "2",
            Role::Staff,
            "Staff Member",
            "https://images.unsplash.com/photo-1494790108755-2616b612b8e5?w=150&h=150&fit=crop&crop=face",
            Role::Staff.default_permissions(),
        ),
        demo_account(
            "3",
            Role::Coach,
            "Personal Trainer",
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face",
            Role::Coach.default_permissions(),
        ),
        demo_account(
            "4",
            Role::User,
            "John Doe",
            "https://images.unsplash.com/photo-1527980965255-d3b416303d12?w=150&h=150&fit=crop&crop=face",
            Role::User.default_permissions(),
        ),
    ]
}

/// Demo account profiles, without passwords.
///
/// Each account's password is `<username>123`.
pub fn demo_accounts() -> Vec<UserProfile> {
    seed_accounts()
        .into_iter()
        .map(|account| account.profile)
        .collect()
}

/// Mock user service that records calls for test assertions.
pub struct MockAuthService {
    accounts: Mutex<Vec<DemoAccount>>,
    ttl: chrono::Duration,
    calls: Mutex<Vec<MockCall>>,
    scripted: Mutex<VecDeque<LoginResponse>>,
    hold_logins: AtomicBool,
    login_started: Notify,
    login_release: Notify,
}

impl MockAuthService {
    /// Create a mock issuing 24 hour credentials.
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::hours(24))
    }

    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        Self {
            accounts: Mutex::new(seed_accounts()),
            ttl,
            calls: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            hold_logins: AtomicBool::new(false),
            login_started: Notify::new(),
            login_release: Notify::new(),
        }
    }

    /// Return all recorded calls.
    pub fn recorded_calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .expect("calls lock poisoned, prior test panicked")
            .clone()
    }

    /// Answer the next login with `response` instead of checking accounts.
    pub fn script_login(&self, response: LoginResponse) {
        self.scripted
            .lock()
            .expect("script lock poisoned, prior test panicked")
            .push_back(response);
    }

    /// Park subsequent logins until [`release_login`](Self::release_login).
    pub fn hold_logins(&self) {
        self.hold_logins.store(true, Ordering::SeqCst);
    }

    /// Wait until a held login has reached the mock.
    pub async fn login_started(&self) {
        self.login_started.notified().await;
    }

    /// Let one held login proceed and stop holding new ones.
    pub fn release_login(&self) {
        self.hold_logins.store(false, Ordering::SeqCst);
        self.login_release.notify_one();
    }

    fn record(&self, call: MockCall) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .map_err(|e| ServiceError::Request(format!("calls lock poisoned: {e}")))?
            .push(call);
        Ok(())
    }

    fn issue(&self, profile: &UserProfile) -> LoginResponse {
        LoginResponse {
            success: true,
            token: Some(codec::encode(&TokenClaims::new(profile, self.ttl))),
            user: Some(profile.clone()),
            message: None,
        }
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        tracing::debug!(identifier = %identifier, "Mock user service: login");
        self.record(MockCall::Login {
            identifier: identifier.to_string(),
        })?;

        if self.hold_logins.load(Ordering::SeqCst) {
            self.login_started.notify_one();
            self.login_release.notified().await;
        }

        let scripted = self
            .scripted
            .lock()
            .map_err(|e| ServiceError::Request(format!("script lock poisoned: {e}")))?
            .pop_front();
        if let Some(response) = scripted {
            return Ok(response);
        }

        let accounts = self
            .accounts
            .lock()
            .map_err(|e| ServiceError::Request(format!("accounts lock poisoned: {e}")))?;

        let needle = identifier.trim();
        let account = accounts.iter().find(|account| {
            account.profile.email.eq_ignore_ascii_case(needle) || account.profile.username == needle
        });

        Ok(match account {
            Some(account) if account.password == password => self.issue(&account.profile),
            _ => LoginResponse::rejected(INVALID_CREDENTIALS),
        })
    }

    async fn refresh(&self, token: &str) -> Result<LoginResponse, ServiceError> {
        tracing::debug!("Mock user service: refresh");
        self.record(MockCall::Refresh)?;

        let claims = match codec::decode(token) {
            Ok(claims) => claims,
            Err(e) => return Ok(LoginResponse::rejected(e.to_string())),
        };

        let accounts = self
            .accounts
            .lock()
            .map_err(|e| ServiceError::Request(format!("accounts lock poisoned: {e}")))?;

        Ok(
            match accounts.iter().find(|account| account.profile.id == claims.id) {
                Some(account) => self.issue(&account.profile),
                None => LoginResponse::rejected("User no longer exists"),
            },
        )
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError> {
        tracing::debug!("Mock user service: logout");
        self.record(MockCall::Logout {
            with_token: token.is_some(),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        tracing::debug!(email = %request.email, "Mock user service: register");
        self.record(MockCall::Register {
            email: request.email.clone(),
        })?;

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| ServiceError::Request(format!("accounts lock poisoned: {e}")))?;

        let taken = accounts.iter().any(|account| {
            account.profile.email.eq_ignore_ascii_case(&request.email)
                || account.profile.username == request.username
        });
        if taken {
            return Ok(RegisterResponse {
                success: false,
                message: Some("User already exists".to_string()),
            });
        }

        let id = (accounts.len() + 1).to_string();
        accounts.push(DemoAccount {
            profile: UserProfile {
                id,
                username: request.username.clone(),
                email: request.email.clone(),
                role: Role::User,
                name: request.name.clone(),
                permissions: Role::User
                    .default_permissions()
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
                avatar: None,
            },
            password: request.password.clone(),
        });

        Ok(RegisterResponse {
            success: true,
            message: Some("Registration successful".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_accounts_cover_every_role() {
        let accounts = demo_accounts();
        assert_eq!(accounts.len(), Role::ALL.len());
        for role in Role::ALL {
            assert!(accounts.iter().any(|account| account.role == role));
        }

        let staff = accounts.iter().find(|a| a.username == "staff").unwrap();
        assert_eq!(staff.email, "staff@gym.com");
        assert!(staff.permissions.contains("gymroom"));
    }

    #[tokio::test]
    async fn test_login_by_email_or_username() {
        let service = MockAuthService::new();

        let by_email = service.login("coach@gym.com", "coach123").await.unwrap();
        assert!(by_email.success);
        let by_username = service.login("coach", "coach123").await.unwrap();
        assert!(by_username.success);

        let token = by_email.token.unwrap();
        let claims = codec::decode(&token).unwrap();
        assert_eq!(claims.id, "3");
        assert_eq!(claims.role, Role::Coach);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let service = MockAuthService::new();

        let response = service.login("admin@gym.com", "wrong").await.unwrap();
        assert!(!response.success);
        assert!(response.token.is_none());
        assert_eq!(response.message.as_deref(), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_scripted_login_takes_priority() {
        let service = MockAuthService::new();
        service.script_login(LoginResponse::rejected("account locked"));

        let response = service.login("admin@gym.com", "admin123").await.unwrap();
        assert_eq!(response.message.as_deref(), Some("account locked"));

        // Script is consumed
        let response = service.login("admin@gym.com", "admin123").await.unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_refresh_reissues_for_valid_token() {
        let service = MockAuthService::new();
        let token = service
            .login("user", "user123")
            .await
            .unwrap()
            .token
            .unwrap();

        let refreshed = service.refresh(&token).await.unwrap();
        assert!(refreshed.success);
        assert_eq!(refreshed.user.unwrap().username, "user");

        let rejected = service.refresh("not-a-token").await.unwrap();
        assert!(!rejected.success);
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let service = MockAuthService::with_ttl(-chrono::Duration::minutes(1));
        let response = service.login("user", "user123").await.unwrap();
        let token = response.token.unwrap();

        let refreshed = service.refresh(&token).await.unwrap();
        assert!(!refreshed.success);
        assert_eq!(refreshed.message.as_deref(), Some("Credential has expired"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = MockAuthService::new();
        let request = RegisterRequest {
            username: "newbie".to_string(),
            email: "newbie@gym.com".to_string(),
            password: "s3cret".to_string(),
            name: "New Member".to_string(),
            phone: None,
        };

        assert!(service.register(&request).await.unwrap().success);
        assert!(!service.register(&request).await.unwrap().success);

        let response = service.login("newbie@gym.com", "s3cret").await.unwrap();
        let user = response.user.unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.permissions.contains("dashboard"));
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let service = MockAuthService::new();
        service.login("admin", "admin123").await.unwrap();
        service.logout(None).await.unwrap();

        assert_eq!(
            service.recorded_calls(),
            vec![
                MockCall::Login {
                    identifier: "admin".to_string()
                },
                MockCall::Logout { with_token: false },
            ]
        );
    }
}
