mod init;
mod schema;

pub use init::run_init_wizard;
pub use schema::{validate_config, Config, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that overrides `api_url`
pub const API_URL_ENV: &str = "PODIUM_API_URL";

/// Get the config directory path (~/.config/podium/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("podium")
}

/// Get the default config file path (~/.config/podium/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file and apply environment overrides.
///
/// With no explicit `path`, a missing default file yields the defaults. An
/// explicit path that does not exist is an error.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)?
        }
        None => {
            let path = get_config_path();
            if path.exists() {
                read_config(&path)?
            } else {
                debug!(path = %path.display(), "no config file, using defaults");
                Config::default()
            }
        }
    };

    apply_env_override(&mut config, std::env::var(API_URL_ENV).ok());
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))
}

fn apply_env_override(config: &mut Config, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        debug!(api_url = %url, "api_url overridden from environment");
        config.api_url = url;
    }
}

/// Write the config as YAML, creating parent directories
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}
