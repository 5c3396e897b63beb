//! Configuration management for bundle-cache
//!
//! Settings come from flags, environment variables (handled by clap), the
//! optional config file, and computed defaults, in that order. They are
//! resolved once into an immutable [`Settings`] value.

pub mod schema;
mod settings;

pub use schema::ConfigFile;
pub use settings::{Overrides, Settings, DEFAULT_ENDPOINT, DEFAULT_REGION};

use crate::error::{CacheError, CacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration file loader
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bundle-cache")
            .join("config.toml")
    }

    /// Load the config file, falling back to an empty one if it doesn't exist
    pub async fn load(&self) -> CacheResult<ConfigFile> {
        if !self.config_path.exists() {
            debug!(
                "Config file {} not found, using defaults",
                self.config_path.display()
            );
            return Ok(ConfigFile::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> CacheResult<ConfigFile> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CacheError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| CacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nonexistent.toml"));

        let config = manager.load().await.unwrap();
        assert!(config.s3.bucket.is_none());
    }

    #[tokio::test]
    async fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[s3]\nbucket = \"bundles\"\nregion = \"eu-west-1\"\n").unwrap();

        let config = ConfigManager::with_path(path.clone()).load().await.unwrap();
        assert_eq!(config.s3.bucket.as_deref(), Some("bundles"));
        assert_eq!(config.s3.region.as_deref(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[s3\nbucket = ").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, CacheError::ConfigInvalid { .. }));
    }

    #[test]
    fn default_path_is_named_after_tool() {
        let path = ConfigManager::default_config_path();
        assert!(path.ends_with("bundle-cache/config.toml"));
    }
}
