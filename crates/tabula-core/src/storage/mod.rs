//! Blob key-value substrate.
//!
//! The store persists whole JSON documents under a handful of fixed keys.
//! Each `set` replaces the whole value of a key, so a failed write leaves
//! the previous value intact.

mod memory;

pub use memory::MemoryBlobStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Persisted document keys.
pub mod keys {
    pub const PROJECTS: &str = "tab_projects";
    pub const SESSION_SNAPSHOTS: &str = "session_snapshots";
    pub const LAST_SESSION: &str = "last_session";
    pub const SESSION_STATE: &str = "session_state";
    pub const RECENT_INTENTS: &str = "recent_intents";
    pub const USER_SETTINGS: &str = "user_settings";
}

/// An async get/set/remove primitive over named JSON documents.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Replace a key's value atomically on `set`
/// - Reject writes that would push the total past [`BlobStore::quota_bytes`]
///   with [`crate::TabulaError::BackingStore`]
/// - Treat removing an absent key as success
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the document stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Lists every key currently holding a value.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Capacity enforced by the substrate, in bytes.
    fn quota_bytes(&self) -> u64;
}

/// Size of a document as the substrate accounts for it: its compact JSON
/// serialization plus the key name.
pub fn document_size(key: &str, value: &Value) -> u64 {
    let body = serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0);
    (key.len() + body) as u64
}
