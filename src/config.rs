//! Configuration management for notevault.
//!
//! Loads configuration from environment variables (and a `.env` file if
//! present). Library types take `&Config` explicitly; the global accessor
//! exists for the binary.

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin plus base path; endpoint paths are appended verbatim.
    pub base_url: String,
    /// Transport timeout. `None` leaves the HTTP client default in place.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// File the credential pair is persisted to.
    pub credentials_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api: ApiConfig {
                base_url: env_or("NOTEVAULT_API_URL", DEFAULT_API_URL),
                timeout: env::var("NOTEVAULT_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs),
                user_agent: env::var("NOTEVAULT_USER_AGENT")
                    .unwrap_or_else(|_| default_user_agent()),
            },
            storage: StorageConfig {
                credentials_path: env::var("NOTEVAULT_CREDENTIALS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_credentials_path()),
            },
        }
    }

    /// Configuration pointing at `base_url` with defaults elsewhere.
    /// Does not read the environment.
    pub fn for_api(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                timeout: None,
                user_agent: default_user_agent(),
            },
            storage: StorageConfig {
                credentials_path: default_credentials_path(),
            },
        }
    }
}

fn default_user_agent() -> String {
    format!("notevault/{}", env!("CARGO_PKG_VERSION"))
}

fn default_credentials_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notevault")
        .join("credentials.json")
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
