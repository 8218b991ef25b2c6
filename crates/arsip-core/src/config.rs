//! Client configuration.
//!
//! Configuration is stored at `~/.config/arsip/config.json`. The backend base
//! URL can be overridden with the `ARSIP_API_URL` environment variable; the
//! value is normalized so it always ends with the `/api/v1` prefix the backend
//! mounts its routes under.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application name used for config/data directory paths
const APP_NAME: &str = "arsip";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default backend base URL for local development
const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// API route prefix the backend serves under
const API_PREFIX: &str = "/api/v1";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "ARSIP_API_URL";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a {0} directory for this platform")]
    MissingDirectory(&'static str),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, normalized to end with `/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bounded request timeout; a timeout surfaces as a network error
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Last username used to log in, prefilled by the CLI prompt
    #[serde(default)]
    pub last_username: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
            last_username: None,
        }
    }
}

impl Config {
    /// Load config from disk, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = {
            let path = Self::config_path()?;
            if path.exists() {
                let contents = std::fs::read_to_string(&path)?;
                serde_json::from_str(&contents)?
            } else {
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.base_url = normalize_base_url(&url);
        } else {
            config.base_url = normalize_base_url(&config.base_url);
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::MissingDirectory("config"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted session state (`auth_token`, `auth_user`).
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::MissingDirectory("data"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build a config around an explicit base URL, normalizing it.
    pub fn with_base_url(url: &str) -> Self {
        Self {
            base_url: normalize_base_url(url),
            ..Self::default()
        }
    }
}

/// Strip any trailing slash and ensure the `/api/v1` prefix is appended.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}
