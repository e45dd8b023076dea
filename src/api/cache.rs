use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Whether directory responses are cached
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
}

/// Get the platform-appropriate cache directory for podium
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("podium/directory-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/podium/directory-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Last successful directory listings (categories, events), kept on disk
/// and read back only when a live fetch fails.
#[derive(Clone, Debug)]
pub struct DirectoryCache {
    cache_path: PathBuf,
}

impl DirectoryCache {
    pub fn new(cache_path: PathBuf) -> Self {
        Self { cache_path }
    }

    pub fn store<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec(items).context("Failed to serialize cache entry")?;
        cacache::write_sync(&self.cache_path, key, &bytes)
            .with_context(|| format!("Failed to write cache entry '{}'", key))?;
        debug!(key, items = items.len(), "cached directory listing");
        Ok(())
    }

    /// Load a cached listing. Missing or unreadable entries are a miss.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.cache_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove cache directory"),
        }
    }
}

pub fn categories_key() -> String {
    "categories".to_string()
}

pub fn events_key(category: Option<i64>) -> String {
    match category {
        Some(id) => format!("events:category={}", id),
        None => "events:all".to_string(),
    }
}
