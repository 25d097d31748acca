//! Session lifecycle integration tests
//!
//! Login, logout, refresh and reload against the demo-account mock with a
//! file-backed session store.

use gymdesk_auth::{codec, AuthError, AuthState, LoginResponse, Role};
use gymdesk_gateway::mock::MockCall;

use crate::common::{accounts, TestApp};

mod common;

#[test_log::test(tokio::test)]
async fn test_login_stores_session_and_survives_reload() {
    let app = TestApp::new();
    let (email, password) = accounts::COACH;

    let record = app.auth.login(email, password).await.unwrap();
    assert_eq!(record.user.role, Role::Coach);
    assert_eq!(app.auth.state(), AuthState::Authenticated);
    assert!(app.session_path.exists());

    let claims = codec::decode(&record.token).unwrap();
    assert_eq!(claims.email, email);

    let reloaded = app.reload();
    assert_eq!(reloaded.state(), AuthState::Authenticated);
    assert_eq!(reloaded.get_current_user(), Some(record.user));
    assert_eq!(reloaded.token(), Some(record.token));
}

#[test_log::test(tokio::test)]
async fn test_failed_login_with_stub_message_leaves_store_empty() {
    let app = TestApp::new();
    app.service.script_login(LoginResponse {
        success: false,
        ..LoginResponse::default()
    });
    app.service.script_login(LoginResponse::rejected("bad password"));

    let err = app.auth.login("admin@gym.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed");

    let err = app.auth.login("admin@gym.com", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::RemoteAuthFailure {
            message: "bad password".to_string()
        }
    );

    assert_eq!(app.auth.session().get(), None);
    assert!(!app.auth.is_authenticated());
    assert_eq!(app.auth.state(), AuthState::Error);
}

#[test_log::test(tokio::test)]
async fn test_wrong_password_clears_previous_session() {
    let app = TestApp::new();
    let (email, password) = accounts::ADMIN;

    app.auth.login(email, password).await.unwrap();
    assert!(app.auth.is_authenticated());

    let err = app.auth.login(email, "wrong").await.unwrap_err();
    assert_eq!(err.code(), "REMOTE_AUTH_FAILURE");
    assert!(!app.auth.is_authenticated());
    assert_eq!(app.reload().state(), AuthState::Anonymous);
}

#[test_log::test(tokio::test)]
async fn test_logout_clears_and_notifies() {
    let app = TestApp::new();
    let (email, password) = accounts::USER;

    app.auth.login(email, password).await.unwrap();
    app.auth.logout().await.unwrap();

    assert_eq!(app.auth.state(), AuthState::Anonymous);
    assert_eq!(app.auth.get_current_user(), None);
    assert!(app
        .service
        .recorded_calls()
        .contains(&MockCall::Logout { with_token: true }));
    assert_eq!(app.reload().state(), AuthState::Anonymous);
}

#[test_log::test(tokio::test)]
async fn test_second_login_while_first_in_flight_is_rejected() {
    let app = TestApp::new();
    app.service.hold_logins();

    let first = {
        let auth = app.auth.clone();
        tokio::spawn(async move { auth.login("staff", "staff123").await })
    };
    app.service.login_started().await;

    let second = app.auth.login("coach", "coach123").await;
    assert_eq!(second.unwrap_err(), AuthError::LoginInProgress);

    app.service.release_login();
    let record = first.await.unwrap().unwrap();
    assert_eq!(record.user.role, Role::Staff);
    assert_eq!(app.auth.get_current_user().unwrap().role, Role::Staff);
}

#[test_log::test(tokio::test)]
async fn test_logout_wins_over_in_flight_login() {
    let app = TestApp::new();
    app.service.hold_logins();

    let pending = {
        let auth = app.auth.clone();
        tokio::spawn(async move { auth.login("admin", "admin123").await })
    };
    app.service.login_started().await;

    app.auth.logout().await.unwrap();
    app.service.release_login();

    let result = pending.await.unwrap();
    assert_eq!(result.unwrap_err(), AuthError::SessionCancelled);
    assert_eq!(app.auth.state(), AuthState::Anonymous);
    assert!(!app.auth.is_authenticated());
    assert_eq!(app.reload().get_current_user(), None);
}

#[test_log::test(tokio::test)]
async fn test_refresh_uses_stored_credential() {
    let app = TestApp::new();

    let err = app.auth.refresh_token().await.unwrap_err();
    assert_eq!(err, AuthError::NoActiveSession);

    let (email, password) = accounts::STAFF;
    app.auth.login(email, password).await.unwrap();
    let refreshed = app.auth.refresh_token().await.unwrap();

    assert_eq!(app.auth.token(), Some(refreshed.clone()));
    assert_eq!(codec::decode(&refreshed).unwrap().email, email);
    assert_eq!(
        app.service.recorded_calls().last(),
        Some(&MockCall::Refresh)
    );
}

#[test_log::test(tokio::test)]
async fn test_expired_session_is_dropped_on_reload() {
    let app = TestApp::new();
    let (email, password) = accounts::COACH;
    let record = app.auth.login(email, password).await.unwrap();

    // Overwrite the stored credential with one that has already expired
    let mut claims = codec::decode(&record.token).unwrap();
    claims.exp = chrono::Utc::now().timestamp_millis() - 60_000;
    app.auth
        .session()
        .set(&codec::encode(&claims), &record.user)
        .unwrap();

    let reloaded = app.reload();
    assert_eq!(reloaded.state(), AuthState::Anonymous);
    assert!(!reloaded.is_authenticated());
}

#[test_log::test(tokio::test)]
async fn test_corrupt_session_file_fails_closed() {
    let app = TestApp::new();
    std::fs::write(
        &app.session_path,
        r#"{"gym_token": "a.b.c", "gym_user": "{oops"}"#,
    )
    .unwrap();

    let reloaded = app.reload();
    assert_eq!(reloaded.state(), AuthState::Anonymous);
    assert_eq!(reloaded.get_current_user(), None);
    assert!(!reloaded.has_permission("dashboard"));
}

#[test_log::test(tokio::test)]
async fn test_cli_commands_share_one_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = gymdesk_common::Config {
        auth_provider: gymdesk_common::AuthProvider::Mock,
        session_store_path: dir.path().join("nested").join("session.json"),
        ..gymdesk_common::Config::default()
    };

    let auth = gymdesk_app::build_authenticator(&config).unwrap();
    let login = gymdesk_app::Command::parse(&[
        "login".to_string(),
        "user".to_string(),
        "user123".to_string(),
    ])
    .unwrap();
    gymdesk_app::run(&auth, login).await.unwrap();

    let auth = gymdesk_app::build_authenticator(&config).unwrap();
    let output = gymdesk_app::run(&auth, gymdesk_app::Command::WhoAmI)
        .await
        .unwrap();
    assert!(output.starts_with("John Doe <user@gym.com> role=user"));
}
