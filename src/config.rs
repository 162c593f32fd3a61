//! Adapter configuration
//!
//! Every field is optional in the TOML file; missing fields take the
//! documented default. The configuration is resolved once, when the
//! adapter is constructed.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Versioned API path appended to the forge base URI
pub const DEFAULT_API_PATH: &str = "/api/v1";

/// Largest page size the forge accepts for branch listings
pub const DEFAULT_BRANCHES_PER_PAGE: u32 = 100;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for rate-limited or failed requests
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("gitea-updater/", env!("CARGO_PKG_VERSION"));

/// Gitea adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// API path appended to the base URI. Default: `/api/v1`
    pub api_path: String,
    /// `per_page` requested when listing branches. Default: 100
    pub branches_per_page: u32,
    /// Request timeout in seconds. Default: 30
    pub timeout_secs: u64,
    /// Retries on rate limiting and network errors. Default: 3
    pub max_retries: u32,
    /// User-Agent sent with every request. Default: `gitea-updater/<version>`
    pub user_agent: String,
    /// Whether a global access token is expected. Default: true
    pub token_required: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            api_path: DEFAULT_API_PATH.to_string(),
            branches_per_page: DEFAULT_BRANCHES_PER_PAGE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token_required: true,
        }
    }
}

impl AdapterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::from_toml(&content).map_err(|message| ConfigError::parse(path, message))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
