//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "marine-axis.toml";

/// Overrides `api.base_url` after the file is read
pub const API_URL_ENV: &str = "MARINE_AXIS_API_URL";

/// Load configuration from marine-axis.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration, falling back to defaults when no file exists
pub fn load_config_or_default() -> Result<Config> {
    match load_config() {
        Ok(config) => Ok(config),
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration to a path
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api.base_url = url;
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; a failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Marine-Axis admin client configuration

[api]
base_url = "${MARINE_AXIS_API_URL:-http://localhost:3000/api/v1}"
timeout_secs = 30

[auth]
storage_namespace = "marine_axis"
session_file = "~/.marine-axis/session.json"

[crud]
debounce_ms = 500
default_limit = 10

[frontend]
allowed_origins = ["http://localhost:5173"]
"#
}
