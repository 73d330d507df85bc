//! Application state for notevault.
//!
//! Wires the credential store, request pipeline and session manager
//! together. Every component gets its handle from here; there is no
//! ambient credential state.

use crate::api::ApiClient;
use crate::config::Config;
use crate::services::{CredentialStore, SessionManager, Workspace};
use crate::Result;

/// Shared handles for one signed-in (or signed-out) user.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current access/refresh credentials.
    pub credentials: CredentialStore,
    /// Authenticated request pipeline.
    pub client: ApiClient,
    /// Login, logout and password operations.
    pub session: SessionManager,
}

impl AppState {
    /// Build the state with credentials persisted at
    /// `config.storage.credentials_path`.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = CredentialStore::from_file(&config.storage.credentials_path);
        Self::with_credentials(config, credentials)
    }

    /// Build the state around an existing credential store.
    pub fn with_credentials(config: &Config, credentials: CredentialStore) -> Result<Self> {
        let client = ApiClient::new(&config.api, credentials.clone())?;
        let session = SessionManager::new(client.clone());

        Ok(Self {
            credentials,
            client,
            session,
        })
    }

    /// A fresh workspace positioned at the root (not yet loaded).
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.client.clone())
    }
}
