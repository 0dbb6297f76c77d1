//! Local key/value store for per-user client state.
//!
//! Every key maps to one JSON document in the store directory. Values are
//! opaque to the store; `library` gives them meaning.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed keys used by the application
pub mod keys {
    pub const WATCH_HISTORY: &str = "animenox_watch_history";
    pub const FAVORITES: &str = "animenox_favorites";
}

/// JSON-file backed key/value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Root store directory
    dir: PathBuf,
    /// Whether persistence is enabled
    enabled: bool,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>, enabled: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if enabled {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
            info!(store_dir = %dir.display(), "Local store opened");
        }

        Ok(Self { dir, enabled })
    }

    /// Read the value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        if !self.enabled {
            return Ok(None);
        }

        let path = self.entry_path(key);
        if !path.exists() {
            debug!(key = key, "Store miss");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store entry: {}", path.display()))?;

        let value: T = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store entry: {}", path.display()))?;

        Ok(Some(value))
    }

    /// Read the value under `key`, or `T::default()` if absent
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    /// Replace the value stored under `key`
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.entry_path(key);
        let content = serde_json::to_string_pretty(value)
            .context("Failed to serialize store entry")?;

        // Atomic replace via sibling temp file
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write store entry: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace store entry: {}", path.display()))?;

        debug!(key = key, path = %path.display(), "Store entry written");
        Ok(())
    }

    /// Remove the value stored under `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove store entry: {}", path.display()))?;
        }
        Ok(())
    }

    /// Check if a value is stored under `key`
    pub fn exists(&self, key: &str) -> bool {
        self.enabled && self.entry_path(key).exists()
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key = key
            .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
            .replace("__", "_");

        self.dir.join(format!("{}.json", safe_key))
    }
}
