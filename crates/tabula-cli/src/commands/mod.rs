//! Command handlers. Each handler runs one store operation and prints the
//! `{success, ...}` envelope, returning whether the operation succeeded.

pub mod maintenance;
pub mod projects;
pub mod session;
pub mod snapshots;
pub mod tabs;

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tabula_core::{OperationResult, TabStore};
use tabula_infrastructure::{ConfigService, JsonDirBlobStore};

/// Everything a command needs: the configured store.
pub struct Context {
    pub store: Arc<TabStore>,
}

impl Context {
    pub async fn open(store_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new().context("Failed to resolve config path")?,
        };
        let config = config_service
            .get_config()
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

        let blob = match store_dir {
            Some(dir) => JsonDirBlobStore::open_with_quota(dir, config.quota_bytes).await,
            None => JsonDirBlobStore::default_location(config.quota_bytes).await,
        }
        .context("Failed to open store directory")?;
        tracing::debug!(path = %blob.base_dir().display(), "Using store directory");

        Ok(Self {
            store: Arc::new(TabStore::new(Arc::new(blob), config)),
        })
    }
}

/// Prints the envelope for `result` as pretty JSON on stdout.
pub fn emit<T: Serialize>(result: tabula_core::Result<T>) -> Result<bool> {
    let envelope = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(envelope.success)
}
