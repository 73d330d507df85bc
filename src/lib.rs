//! notevault - client for a remote notes and files workspace.
//!
//! Authenticates against the service, keeps the session's credentials in
//! a durable store, renews them transparently, and exposes the user's
//! folder hierarchy as a navigable, always-refetched workspace view.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

pub use notevault_models as models;
