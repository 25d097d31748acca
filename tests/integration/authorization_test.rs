//! Authorization integration tests
//!
//! Capability checks for each demo role, through a signed-in authenticator.

use gymdesk_auth::{has_permission, Role, UserProfile};
use gymdesk_gateway::mock::demo_accounts;

use crate::common::{accounts, TestApp};

mod common;

async fn signed_in(credentials: (&str, &str)) -> TestApp {
    let app = TestApp::new();
    app.auth
        .login(credentials.0, credentials.1)
        .await
        .expect("demo login should succeed");
    app
}

#[test_log::test(tokio::test)]
async fn test_anonymous_has_no_capabilities() {
    let app = TestApp::new();

    for capability in ["dashboard", "customer", "all"] {
        assert!(!app.auth.has_permission(capability));
    }
    assert!(!has_permission(None, "dashboard"));
}

#[test_log::test(tokio::test)]
async fn test_admin_holds_every_capability() {
    let app = signed_in(accounts::ADMIN).await;

    for capability in ["customer", "schedule", "dashboard", "anything-at-all"] {
        assert!(app.auth.has_permission(capability), "{capability}");
    }
    assert!(app.auth.current_context().unwrap().is_admin());
}

#[test_log::test(tokio::test)]
async fn test_staff_scope() {
    let app = signed_in(accounts::STAFF).await;

    assert!(app.auth.has_permission("feedback"));
    assert!(app.auth.has_permission("gymroom"));
    assert!(!app.auth.has_permission("schedule"));
    assert!(!app.auth.has_permission("all"));
}

#[test_log::test(tokio::test)]
async fn test_coach_scope() {
    let app = signed_in(accounts::COACH).await;

    assert!(app.auth.has_permission("clients"));
    assert!(app.auth.has_permission("programs"));
    assert!(!app.auth.has_permission("customer"));
}

#[test_log::test(tokio::test)]
async fn test_member_scope() {
    let app = signed_in(accounts::USER).await;

    assert!(app.auth.has_permission("dashboard"));
    assert!(app.auth.has_permission("profile"));
    assert!(!app.auth.has_permission("clients"));
}

#[test_log::test(tokio::test)]
async fn test_capabilities_end_with_logout() {
    let app = signed_in(accounts::STAFF).await;
    assert!(app.auth.has_permission("customer"));

    app.auth.logout().await.unwrap();
    assert!(!app.auth.has_permission("customer"));
}

#[test_log::test(tokio::test)]
async fn test_reloaded_session_keeps_capabilities() {
    let app = signed_in(accounts::COACH).await;

    let reloaded = app.reload();
    assert!(reloaded.has_permission("schedule"));
    assert!(!reloaded.has_permission("gymroom"));
}

#[test]
fn test_demo_profiles_match_role_table() {
    for account in demo_accounts() {
        for capability in account.role.default_permissions() {
            assert!(
                has_permission(Some(&account), capability),
                "{} should hold {}",
                account.username,
                capability
            );
        }
    }
}

#[test]
fn test_empty_permission_list_is_denied() {
    let user = UserProfile {
        id: "42".to_string(),
        username: "revoked".to_string(),
        email: "revoked@gym.com".to_string(),
        role: Role::Staff,
        name: "Revoked Staff".to_string(),
        permissions: Default::default(),
        avatar: None,
    };

    for capability in Role::Staff.default_permissions() {
        assert!(!has_permission(Some(&user), capability), "{capability}");
    }
    assert!(!has_permission(Some(&user), "all"));
}
