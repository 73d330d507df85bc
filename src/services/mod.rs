//! Service layer for notevault.
//!
//! - Credentials (token pair, durable backends)
//! - Session (login, logout, password changes)
//! - Workspace (navigation and re-fetching mutations)

mod credentials;
mod session;
mod workspace;

pub use credentials::{CredentialBackend, CredentialPair, CredentialStore, FileBackend, MemoryBackend};
pub use session::SessionManager;
pub use workspace::{Workspace, WorkspaceEvent};
