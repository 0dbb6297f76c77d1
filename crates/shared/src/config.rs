//! Configuration management for AnimeNox.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Metadata API settings
    pub metadata: MetadataConfig,

    /// Listing controller settings
    #[serde(default)]
    pub listing: ListingConfig,

    /// Local favorites/history store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Metadata API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Provider base URL
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout in seconds (None = transport default)
    pub timeout_secs: Option<u64>,

    /// Endpoint paths, appended to `base_url`
    pub endpoints: EndpointConfig,
}

/// Endpoint paths of the metadata provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Search root; the query is appended as a path segment
    pub anime: String,
    pub advanced_search: String,
    pub popular: String,
    pub trending: String,
    /// Info root; the id is appended as a path segment
    pub info: String,
}

/// Listing controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Debounce quiet window for search in milliseconds
    pub search_debounce_ms: u64,

    /// A page with at least this many items is assumed to have a successor
    pub has_more_threshold: usize,
}

/// Local store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Enable the local store
    pub enabled: bool,

    /// Store directory (relative to data directory)
    pub dir: String,

    /// Maximum number of recently viewed entries kept
    pub max_recent: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            has_more_threshold: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "storage".to_string(),
            max_recent: 10,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            anime: "/meta/anilist".to_string(),
            advanced_search: "/meta/anilist/advanced-search".to_string(),
            popular: "/meta/anilist/popular".to_string(),
            trending: "/meta/anilist/trending".to_string(),
            info: "/meta/anilist/info".to_string(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.consumet.org".to_string(),
            user_agent: concat!("AnimeNox/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            metadata: MetadataConfig::default(),
            listing: ListingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path for the local store directory
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve(&self.storage.dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.metadata.base_url, "https://api.consumet.org");
        assert_eq!(config.metadata.endpoints.trending, "/meta/anilist/trending");
        assert_eq!(config.metadata.timeout_secs, None);
        assert_eq!(config.listing.search_debounce_ms, 500);
        assert_eq!(config.listing.has_more_threshold, 10);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.metadata.base_url = "http://localhost:3000".to_string();
        original_config.metadata.timeout_secs = Some(15);
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.metadata.base_url, "http://localhost:3000");
        assert_eq!(loaded_config.metadata.timeout_secs, Some(15));

        Ok(())
    }

    #[test]
    fn test_optional_sections_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[data]
root_dir = "/var/lib/animenox"

[logging]
log_dir = "logs"
default_level = "debug"
console = true
file = false
json_format = false

[metadata]
base_url = "https://consumet.example"
user_agent = "test"

[metadata.endpoints]
anime = "/meta/anilist"
advanced_search = "/meta/anilist/advanced-search"
popular = "/meta/anilist/popular"
trending = "/meta/anilist/trending"
info = "/meta/anilist/info"
"#,
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.metadata.base_url, "https://consumet.example");
        assert_eq!(config.listing.search_debounce_ms, 500);
        assert!(config.storage.enabled);
        assert_eq!(config.storage_dir(), PathBuf::from("/var/lib/animenox/storage"));

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));

        let storage_dir = config.storage_dir();
        assert!(storage_dir.ends_with("data/storage"));
    }
}
