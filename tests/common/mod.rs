//! Shared fixtures for the integration tests.
//!
//! Each test starts its own wiremock server standing in for the
//! workspace service and builds an `AppState` pointed at it.

#![allow(dead_code)]

use notevault::services::{CredentialPair, CredentialStore, MemoryBackend};
use notevault::{AppState, Config};
use serde_json::{json, Value};
use wiremock::{Match, MockServer, Request};

/// State talking to `server`, starting with `pair` already stored.
pub fn state_with(server: &MockServer, pair: CredentialPair) -> AppState {
    let config = Config::for_api(server.uri());
    AppState::with_credentials(&config, CredentialStore::new(MemoryBackend::with_pair(pair)))
        .expect("valid test config")
}

/// State with an access/refresh pair stored.
pub fn signed_in(server: &MockServer, access: &str, refresh: &str) -> AppState {
    state_with(server, CredentialPair::new(access, refresh))
}

/// State with no credentials.
pub fn signed_out(server: &MockServer) -> AppState {
    state_with(server, CredentialPair::default())
}

pub fn timestamp(minute: u32) -> String {
    format!("2024-03-01T09:{:02}:00Z", minute)
}

pub fn user_json(id: i64, email: &str) -> Value {
    json!({"id": id, "email": email, "created_at": timestamp(0)})
}

pub fn auth_json(access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(1, "ada@example.com"),
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 900
    })
}

pub fn tokens_json(access: &str, refresh: &str) -> Value {
    json!({"access_token": access, "refresh_token": refresh, "expires_in": 900})
}

pub fn folder_json(id: i64, name: &str, parent_id: Option<i64>) -> Value {
    json!({"id": id, "name": name, "parent_id": parent_id, "created_at": timestamp(0)})
}

pub fn note_json(id: i64, content: &str, folder_id: Option<i64>, minute: u32) -> Value {
    json!({"id": id, "note": content, "folder_id": folder_id, "created_at": timestamp(minute)})
}

pub fn file_json(id: i64, name: &str, folder_id: Option<i64>, minute: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "size": 4,
        "mime_type": "text/plain",
        "folder_id": folder_id,
        "created_at": timestamp(minute)
    })
}

/// `GET /folders/{id}` payload with the given children.
pub fn folder_with(id: i64, name: &str, parent_id: Option<i64>, children: Value) -> Value {
    let mut folder = folder_json(id, name, parent_id);
    if let (Some(folder), Some(children)) = (folder.as_object_mut(), children.as_object()) {
        for (key, value) in children {
            folder.insert(key.clone(), value.clone());
        }
    }
    json!({ "folder": folder })
}

pub fn error_json(message: &str) -> Value {
    json!({ "error": message })
}

/// Matches requests whose raw body contains `needle`.
pub struct BodyContains(pub &'static str);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        String::from_utf8_lossy(&request.body).contains(self.0)
    }
}
