//! Session manager tests: login, logout, password change and start-up
//! restore against a mock service.

mod common;

use common::*;
use notevault::services::{CredentialPair, CredentialStore};
use notevault::{AppState, Config};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Login and registration
// ============================================================================

/// Login stores both credentials and authenticated calls use them
#[tokio::test]
async fn test_login_then_authenticated_call() {
    let server = MockServer::start().await;
    let state = signed_out(&server);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json("A", "R")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada@example.com")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = state.session.login("ada@example.com", "pw").await.unwrap();
    assert_eq!(auth.user.email, "ada@example.com");
    assert_eq!(state.credentials.read(), CredentialPair::new("A", "R"));
    assert!(state.session.is_signed_in());

    let user = state.session.current_user().await.unwrap();
    assert_eq!(user.id, 1);
}

/// Rejected login leaves the store as it was
#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    let state = signed_out(&server);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_json("invalid credentials")))
        .mount(&server)
        .await;

    let err = state.session.login("ada@example.com", "nope").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!state.session.is_signed_in());
}

#[tokio::test]
async fn test_register_stores_credentials() {
    let server = MockServer::start().await;
    let state = signed_out(&server);

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_json("A", "R")))
        .expect(1)
        .mount(&server)
        .await;

    state.session.register("ada@example.com", "pw").await.unwrap();
    assert_eq!(state.credentials.read(), CredentialPair::new("A", "R"));
}

/// Registration conflicts surface the service message
#[tokio::test]
async fn test_register_conflict() {
    let server = MockServer::start().await;
    let state = signed_out(&server);

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_json("email already registered")))
        .mount(&server)
        .await;

    let err = state.session.register("ada@example.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "email already registered");
    assert!(state.credentials.read().is_empty());
}

// ============================================================================
// Logout
// ============================================================================

/// Logout sends the refresh credential without a bearer header
#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(body_json(json!({"refresh_token": "R"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "logged out"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = state.session.logout().await.unwrap();
    assert_eq!(response.message, "logged out");
    assert!(state.credentials.read().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

/// Local credentials are forgotten even when revocation fails
#[rstest]
#[case::server_error(500)]
#[case::unauthorized(401)]
#[case::bad_request(400)]
#[tokio::test]
async fn test_logout_always_clears(#[case] status: u16) {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(status).set_body_json(error_json("nope")))
        .expect(1)
        .mount(&server)
        .await;

    assert!(state.session.logout().await.is_err());
    assert!(state.credentials.read().is_empty());
}

#[tokio::test]
async fn test_logout_clears_when_unreachable() {
    let state = AppState::with_credentials(
        &Config::for_api("http://127.0.0.1:9"),
        CredentialStore::in_memory(),
    )
    .unwrap();
    state.credentials.write("A", "R");

    assert!(state.session.logout().await.is_err());
    assert!(!state.session.is_signed_in());
}

#[tokio::test]
async fn test_logout_all_clears_on_success() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("POST"))
        .and(path("/auth/logout-all"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "all sessions revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = state.session.logout_all().await.unwrap();
    assert_eq!(response.message, "all sessions revoked");
    assert!(state.credentials.read().is_empty());
}

#[tokio::test]
async fn test_logout_all_failure_keeps_credentials() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("POST"))
        .and(path("/auth/logout-all"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(state.session.logout_all().await.is_err());
    assert_eq!(state.credentials.read(), CredentialPair::new("A", "R"));
}

// ============================================================================
// Password change
// ============================================================================

#[tokio::test]
async fn test_change_password_ends_session() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("PUT"))
        .and(path("/auth/password"))
        .and(header("authorization", "Bearer A"))
        .and(body_json(json!({"current_password": "old", "new_password": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "password changed"})))
        .expect(1)
        .mount(&server)
        .await;

    state.session.change_password("old", "new").await.unwrap();
    assert!(!state.session.is_signed_in());
}

#[tokio::test]
async fn test_change_password_rejected_keeps_session() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("PUT"))
        .and(path("/auth/password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_json("current password is incorrect")))
        .mount(&server)
        .await;

    let err = state.session.change_password("wrong", "new").await.unwrap_err();
    assert_eq!(err.to_string(), "current password is incorrect");
    assert_eq!(state.credentials.read(), CredentialPair::new("A", "R"));
}

// ============================================================================
// Restore
// ============================================================================

/// Nothing stored means nothing to validate and no request
#[tokio::test]
async fn test_restore_without_credentials() {
    let server = MockServer::start().await;
    let state = signed_out(&server);

    assert!(state.session.restore().await.unwrap().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_valid_session() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(7, "ada@example.com")))
        .mount(&server)
        .await;

    let user = state.session.restore().await.unwrap().unwrap();
    assert_eq!(user.id, 7);
    assert!(state.session.is_signed_in());
}

/// An expired access token is renewed during restore
#[tokio::test]
async fn test_restore_renews_expired_token() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("A2", "R2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(7, "ada@example.com")))
        .mount(&server)
        .await;

    assert!(state.session.restore().await.unwrap().is_some());
    assert_eq!(state.credentials.read(), CredentialPair::new("A2", "R2"));
}

/// Rejected credentials are dropped and restore reports signed-out
#[tokio::test]
async fn test_restore_rejected_session() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert!(state.session.restore().await.unwrap().is_none());
    assert!(!state.session.is_signed_in());
}

/// Service failures other than 401 keep the stored credentials
#[tokio::test]
async fn test_restore_server_error_keeps_credentials() {
    let server = MockServer::start().await;
    let state = signed_in(&server, "A", "R");

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(state.session.restore().await.is_err());
    assert!(state.session.is_signed_in());
}

// ============================================================================
// Persistence
// ============================================================================

/// Credentials written by one run are visible to the next
#[tokio::test]
async fn test_credentials_survive_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::for_api(server.uri());
    config.storage.credentials_path = dir.path().join("credentials.json");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json("A", "R")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ada@example.com")))
        .expect(1)
        .mount(&server)
        .await;

    let first = AppState::new(&config).unwrap();
    first.session.login("ada@example.com", "pw").await.unwrap();
    drop(first);

    let second = AppState::new(&config).unwrap();
    let user = second.session.restore().await.unwrap();
    assert_eq!(user.map(|u| u.email).as_deref(), Some("ada@example.com"));
}
