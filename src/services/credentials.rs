//! Credential store.
//!
//! Holds the access/refresh token pair in memory and mirrors every change
//! to a durable backend. The in-memory pair is the source of truth for
//! the running process; the backend only matters across restarts.
//!
//! Durable writes are fire-and-forget: a failing backend is logged and
//! never fails the operation that changed the credentials.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Access and refresh credentials. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Durable storage for the credential pair.
///
/// Calls are synchronous and expected to be fast (a small local file or
/// an in-process map).
pub trait CredentialBackend: Send + Sync {
    fn load(&self) -> Result<CredentialPair>;
    fn save(&self, pair: &CredentialPair) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// Backends
// ============================================================================

/// Persists the pair as a JSON file.
///
/// Writes go through a temporary file in the same directory followed by a
/// rename, so a crash never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialBackend for FileBackend {
    fn load(&self) -> Result<CredentialPair> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CredentialPair::default()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!("Invalid credential file {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .map_err(|e| Error::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = serde_json::to_vec_pretty(pair)
            .map_err(|e| Error::Storage(format!("Failed to encode credentials: {}", e)))?;

        // NamedTempFile is created with owner-only permissions on unix.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::Storage(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::Storage(format!("Failed to write credentials: {}", e)))?;
        tmp.persist(&self.path).map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Keeps the "durable" copy in process memory. Used for ephemeral
/// sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pair: Mutex<CredentialPair>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored pair, as if persisted by an earlier run.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(pair),
        }
    }

    pub fn snapshot(&self) -> CredentialPair {
        self.pair.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CredentialBackend for MemoryBackend {
    fn load(&self) -> Result<CredentialPair> {
        Ok(self.snapshot())
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        *self.pair.lock().unwrap_or_else(|e| e.into_inner()) = pair.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.pair.lock().unwrap_or_else(|e| e.into_inner()) = CredentialPair::default();
        Ok(())
    }
}

impl<B: CredentialBackend + ?Sized> CredentialBackend for Arc<B> {
    fn load(&self) -> Result<CredentialPair> {
        (**self).load()
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        (**self).save(pair)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Shared handle to the current credentials.
///
/// Cloning is cheap; all clones see the same pair. Only the request
/// pipeline's renewal path and the session manager write to it.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<CredentialStoreInner>,
}

struct CredentialStoreInner {
    pair: RwLock<CredentialPair>,
    backend: Box<dyn CredentialBackend>,
}

impl CredentialStore {
    /// Create a store initialised from `backend`. An unreadable backend
    /// is logged and treated as empty.
    pub fn new(backend: impl CredentialBackend + 'static) -> Self {
        let pair = backend.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load stored credentials, starting signed out");
            CredentialPair::default()
        });

        debug!(
            has_access = pair.access_token.is_some(),
            has_refresh = pair.refresh_token.is_some(),
            "Credential store initialised"
        );

        Self {
            inner: Arc::new(CredentialStoreInner {
                pair: RwLock::new(pair),
                backend: Box::new(backend),
            }),
        }
    }

    /// Store backed by a JSON file at `path`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }

    /// Store with no durable copy beyond this process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn read(&self) -> CredentialPair {
        self.inner
            .pair
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    /// True when any credential is held.
    pub fn has_session(&self) -> bool {
        !self.read().is_empty()
    }

    /// Replace both credentials.
    pub fn write(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let pair = CredentialPair::new(access_token, refresh_token);
        *self.inner.pair.write().unwrap_or_else(|e| e.into_inner()) = pair.clone();

        if let Err(e) = self.inner.backend.save(&pair) {
            warn!(error = %e, "Failed to persist credentials");
        }
    }

    /// Remove both credentials.
    pub fn clear(&self) {
        *self.inner.pair.write().unwrap_or_else(|e| e.into_inner()) = CredentialPair::default();

        if let Err(e) = self.inner.backend.clear() {
            warn!(error = %e, "Failed to remove persisted credentials");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pair = self.read();
        f.debug_struct("CredentialStore")
            .field("has_access", &pair.access_token.is_some())
            .field("has_refresh", &pair.refresh_token.is_some())
            .finish()
    }
}
