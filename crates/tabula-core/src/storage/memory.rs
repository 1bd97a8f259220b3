use super::{BlobStore, document_size};
use crate::config::DEFAULT_QUOTA_BYTES;
use crate::error::{Result, TabulaError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory substrate with quota enforcement.
///
/// Used for ephemeral stores and tests. Counts successful writes so callers
/// can check that idle operations do not touch storage.
pub struct MemoryBlobStore {
    documents: RwLock<BTreeMap<String, Value>>,
    quota_bytes: AtomicU64,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            quota_bytes: AtomicU64::new(quota_bytes),
            writes: AtomicUsize::new(0),
        }
    }

    /// Changes the quota; existing documents are kept even if now over it.
    pub fn set_quota(&self, quota_bytes: u64) {
        self.quota_bytes.store(quota_bytes, Ordering::SeqCst);
    }

    /// Number of successful `set`/`remove` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut documents = self.documents.write().await;

        let others: u64 = documents
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, doc)| document_size(existing, doc))
            .sum();
        let projected = others + document_size(key, &value);
        let quota = self.quota_bytes();
        if projected > quota {
            return Err(TabulaError::backing_store(format!(
                "quota exceeded writing '{}': {} of {} bytes",
                key, projected, quota
            )));
        }

        documents.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.documents.write().await.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }

    fn quota_bytes(&self) -> u64 {
        self.quota_bytes.load(Ordering::SeqCst)
    }
}
