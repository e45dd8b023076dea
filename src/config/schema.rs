use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "15s";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the results store
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout, humantime format ("15s", "1m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// Where exported workbooks go; current directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout: default_request_timeout(),
            export_dir: None,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(self.request_timeout.trim())
            .with_context(|| format!("Invalid request_timeout '{}'", self.request_timeout))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Validate the configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match Url::parse(config.api_url.trim()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "api_url: unsupported scheme '{}' (use http or https)",
            url.scheme()
        )),
        Err(e) => errors.push(format!("api_url: invalid '{}' - {}", config.api_url, e)),
    }

    match humantime::parse_duration(config.request_timeout.trim()) {
        Ok(d) if d.is_zero() => errors.push("request_timeout: must be greater than zero".to_string()),
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "request_timeout: invalid '{}' - {}",
            config.request_timeout, e
        )),
    }

    if let Some(dir) = &config.export_dir {
        if !dir.is_dir() {
            errors.push(format!("export_dir: {} is not a directory", dir.display()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
