//! Session manager.
//!
//! Login, registration, logout and password changes on top of the
//! request pipeline. This is the only component besides credential
//! renewal that writes to the credential store.

use notevault_models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RefreshRequest, User,
};
use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Auth, RequestBody};
use crate::error::Result;

/// Service for session lifecycle operations.
#[derive(Debug, Clone)]
pub struct SessionManager {
    client: ApiClient,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// True when credentials are stored locally. Says nothing about
    /// whether the service still accepts them.
    pub fn is_signed_in(&self) -> bool {
        self.client.credentials().has_session()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth = self.authenticate("/auth/login", email, password).await?;
        info!(
            user_id = auth.user.id,
            expires_at = %auth.expires_at(Utc::now()),
            "Logged in"
        );
        Ok(auth)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth = self.authenticate("/auth/register", email, password).await?;
        info!(user_id = auth.user.id, "Registered");
        Ok(auth)
    }

    async fn authenticate(&self, endpoint: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .client
            .send(
                Method::POST,
                endpoint,
                RequestBody::json(&LoginRequest { email, password })?,
                Auth::Skip,
            )
            .await?;

        self.client
            .credentials()
            .write(auth.access_token.clone(), auth.refresh_token.clone());
        Ok(auth)
    }

    /// Revoke the current refresh credential on the service and forget
    /// local credentials. Local credentials are cleared even when the
    /// revocation call fails; that failure is still returned.
    pub async fn logout(&self) -> Result<MessageResponse> {
        let refresh_token = self.client.credentials().refresh_token();

        let result = match RequestBody::json(&RefreshRequest {
            refresh_token: refresh_token.as_deref(),
        }) {
            Ok(body) => {
                self.client
                    .send::<MessageResponse>(Method::POST, "/auth/logout", body, Auth::Skip)
                    .await
            }
            Err(e) => Err(e),
        };

        self.client.credentials().clear();

        match &result {
            Ok(_) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Logout request failed, local credentials cleared"),
        }
        result
    }

    /// Revoke every session of the user. Local credentials are cleared
    /// only when the service confirms.
    pub async fn logout_all(&self) -> Result<MessageResponse> {
        let response: MessageResponse = self
            .client
            .send(
                Method::POST,
                "/auth/logout-all",
                RequestBody::Empty,
                Auth::Required,
            )
            .await?;

        self.client.credentials().clear();
        info!("Logged out of all sessions");
        Ok(response)
    }

    pub async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }

    /// Change the password. The service invalidates existing sessions, so
    /// local credentials are cleared on success and the user must log in
    /// again.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let response: MessageResponse = self
            .client
            .put(
                "/auth/password",
                &ChangePasswordRequest {
                    current_password,
                    new_password,
                },
            )
            .await?;

        self.client.credentials().clear();
        info!("Password changed, credentials cleared");
        Ok(response)
    }

    /// Validate stored credentials at start-up.
    ///
    /// Returns `None` without a network call when nothing is stored, and
    /// `None` when the service rejects the credentials even after renewal.
    /// Other failures (service unreachable) are returned as errors and
    /// leave the credentials in place.
    pub async fn restore(&self) -> Result<Option<User>> {
        if !self.is_signed_in() {
            debug!("No stored session");
            return Ok(None);
        }

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, "Restored session");
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                info!("Stored session is no longer valid");
                self.client.credentials().clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
