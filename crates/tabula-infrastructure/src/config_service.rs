//! Configuration service implementation.
//!
//! Loads the store policy from the configuration file
//! (~/.config/tabula/config.toml), creating it with defaults if missing.

use crate::paths::TabulaPaths;
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tabula_core::{Result, StoreConfig, TabulaError};

/// Configuration service that loads and caches the store configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<StoreConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the platform config file.
    pub fn new() -> Result<Self> {
        let path = TabulaPaths::config_file().map_err(|e| TabulaError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a ConfigService reading from a custom location.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<StoreConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<StoreConfig> {
        let file = AtomicTomlFile::<StoreConfig>::new(self.path.clone());

        match file.load()? {
            Some(config) => {
                tracing::debug!(path = %self.path.display(), "Loaded store configuration");
                Ok(config)
            }
            None => {
                let default_config = StoreConfig::default();
                file.save(&default_config)?;
                tracing::info!(path = %self.path.display(), "Created default configuration file");
                Ok(default_config)
            }
        }
    }
}
