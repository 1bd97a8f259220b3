//! The project/tab store.
//!
//! `TabStore` owns the project collection and everything layered on it:
//! CRUD, the soft-delete/undo/purge lifecycle of tabs, session snapshots,
//! the crash marker, usage accounting and the recent-intent list.
//!
//! Every mutation is a read-modify-write of a whole document. Mutations are
//! serialized through an async write gate, so the scheduler and the
//! presentation layer can share one store without losing updates.

mod maintenance;
mod preferences;
mod projects;
mod removal;
mod snapshots;

pub use projects::TabHit;
pub use removal::CleanupReport;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Result, TabulaError};
use crate::project::Project;
use crate::storage::{BlobStore, keys};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub struct TabStore {
    blob: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    write_gate: Mutex<()>,
}

impl TabStore {
    /// Creates a store over `blob` using wall-clock time.
    pub fn new(blob: Arc<dyn BlobStore>, config: StoreConfig) -> Self {
        Self::with_clock(blob, config, Arc::new(SystemClock))
    }

    pub fn with_clock(blob: Arc<dyn BlobStore>, config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            blob,
            clock,
            config,
            write_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub(crate) async fn write_gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Loads a document, failing if it exists but does not parse.
    pub(crate) async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.blob.get(key).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                TabulaError::Serialization {
                    format: "JSON".to_string(),
                    message: format!("document '{}': {}", key, e),
                }
            }),
            None => Ok(None),
        }
    }

    /// Loads an auxiliary document, treating a corrupt value as absent.
    ///
    /// Only for documents the store can rebuild (snapshot list, intents,
    /// crash marker). The project collection always goes through [`Self::load`].
    pub(crate) async fn load_lenient<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key).await {
            Err(TabulaError::Serialization { message, .. }) => {
                tracing::warn!("Ignoring unreadable document: {}", message);
                Ok(None)
            }
            other => other,
        }
    }

    pub(crate) async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.blob.set(key, value).await
    }

    pub(crate) async fn load_projects(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self.load(keys::PROJECTS).await?.unwrap_or_default();
        for project in &mut projects {
            project.normalize();
        }
        Ok(projects)
    }

    pub(crate) async fn save_projects(&self, projects: &[Project]) -> Result<()> {
        self.save(keys::PROJECTS, projects).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryBlobStore;
    use chrono::{TimeZone, Utc};

    pub struct Fixture {
        pub store: TabStore,
        pub blob: Arc<MemoryBlobStore>,
        pub clock: Arc<ManualClock>,
    }

    pub fn fixture() -> Fixture {
        fixture_with(StoreConfig::default())
    }

    pub fn fixture_with(config: StoreConfig) -> Fixture {
        let blob = Arc::new(MemoryBlobStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
        ));
        let store = TabStore::with_clock(blob.clone(), config, clock.clone());
        Fixture { store, blob, clock }
    }
}
