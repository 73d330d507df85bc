//! Error types for notevault.
//!
//! Uses thiserror for the client-side failure taxonomy: transport
//! failures, authorization failures that survived renewal, service
//! errors carrying the server's message, and local validation.

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Message used when the service gives no usable error body.
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Transport errors
    #[error("Network error: {0}")]
    Transport(String),

    /// A success status whose body was not the expected shape. Shown as
    /// the generic failure message; the parser detail is for logs.
    #[error("{}", GENERIC_FAILURE)]
    Decode(String),

    // Auth errors
    /// A 401 that could not be recovered by credential renewal. Local
    /// credentials have been cleared if a renewal was attempted.
    #[error("{message}")]
    Unauthorized { message: String },

    // Service errors
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Failed to download file")]
    Download { status: Option<StatusCode> },

    // Local errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Build the error for a non-success response from its status and
    /// the service-provided message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized { message }
        } else {
            Self::Api { status, message }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status behind this error, when it came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Api { status, .. } => Some(*status),
            Self::Download { status } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
