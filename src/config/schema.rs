//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub crud: CrudConfig,

    #[serde(default)]
    pub frontend: FrontendConfig,
}

/// Backend API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout; an elapsed timeout is reported as a network error
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Prefix for every persisted key, e.g. `marine_axis.access_token`
    #[serde(default = "default_storage_namespace")]
    pub storage_namespace: String,

    /// File backing the durable session store. A leading `~/` expands to $HOME.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

fn default_storage_namespace() -> String {
    "marine_axis".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from("~/.marine-axis/session.json")
}

impl AuthConfig {
    /// Session file path with `~/` expanded
    pub fn resolved_session_file(&self) -> PathBuf {
        match self.session_file.strip_prefix("~") {
            Ok(rest) => match std::env::var_os("HOME") {
                Some(home) => PathBuf::from(home).join(rest),
                None => rest.to_path_buf(),
            },
            Err(_) => self.session_file.clone(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_namespace: default_storage_namespace(),
            session_file: default_session_file(),
        }
    }
}

/// List-view synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrudConfig {
    /// Quiet period before a filter change triggers a fetch
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_limit() -> u32 {
    10
}

impl CrudConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            default_limit: default_limit(),
        }
    }
}

/// Origins the admin frontend is served from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl FrontendConfig {
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed.trim_end_matches('/') == origin)
    }
}
