//! Directory-backed blob store.
//!
//! Directory structure:
//! ```text
//! base_dir/
//! ├── .lock                    # exclusive writer lock
//! ├── tab_projects.json
//! ├── session_snapshots.json
//! ├── last_session.json
//! └── ...
//! ```

use super::atomic::{FileLock, write_atomic};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tabula_core::config::DEFAULT_QUOTA_BYTES;
use tabula_core::storage::BlobStore;
use tabula_core::{Result, TabulaError};

const EXTENSION: &str = "json";
const LOCK_FILE: &str = ".lock";

/// One compact JSON file per key, replaced atomically on every write.
///
/// Writes take an exclusive lock on `base_dir/.lock`, check the quota
/// against the sizes of the other documents and then swap the file in.
/// Blocking file work runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct JsonDirBlobStore {
    base_dir: PathBuf,
    quota_bytes: u64,
}

impl JsonDirBlobStore {
    /// Opens (creating if needed) a store rooted at `base_dir`.
    pub async fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_quota(base_dir, DEFAULT_QUOTA_BYTES).await
    }

    pub async fn open_with_quota(base_dir: impl AsRef<Path>, quota_bytes: u64) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await?;
        tracing::debug!(path = %base_dir.display(), "Opened blob store directory");
        Ok(Self {
            base_dir,
            quota_bytes,
        })
    }

    /// Opens the store at the platform data directory.
    pub async fn default_location(quota_bytes: u64) -> Result<Self> {
        let dir = crate::paths::TabulaPaths::store_dir()
            .map_err(|e| TabulaError::config(e.to_string()))?;
        Self::open_with_quota(dir, quota_bytes).await
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn document_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(TabulaError::backing_store(format!("invalid key '{}'", key)));
        }
        Ok(self.base_dir.join(format!("{}.{}", key, EXTENSION)))
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> Result<T> + Send + 'static,
    {
        let base_dir = self.base_dir.clone();
        tokio::task::spawn_blocking(move || task(base_dir))
            .await
            .map_err(|e| TabulaError::internal(format!("Failed to join task: {}", e)))?
    }
}

/// Lists `(key, size)` for every document in `base_dir`.
fn scan(base_dir: &Path) -> Result<Vec<(String, u64)>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(base_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if key.starts_with('.') {
            continue;
        }
        let size = fs::metadata(&path)?.len();
        documents.push((key.to_string(), size));
    }
    documents.sort();
    Ok(documents)
}

fn lock(base_dir: &Path) -> Result<FileLock> {
    FileLock::acquire(&base_dir.join(LOCK_FILE))
        .map_err(|e| TabulaError::backing_store(format!("Failed to acquire lock: {}", e)))
}

#[async_trait]
impl BlobStore for JsonDirBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.document_path(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.document_path(key)?;
        let bytes = serde_json::to_vec(&value)?;
        let key = key.to_string();
        let quota = self.quota_bytes;

        self.blocking(move |base_dir| {
            let _lock = lock(&base_dir)?;

            let others: u64 = scan(&base_dir)?
                .into_iter()
                .filter(|(existing, _)| *existing != key)
                .map(|(existing, size)| existing.len() as u64 + size)
                .sum();
            let projected = others + (key.len() + bytes.len()) as u64;
            if projected > quota {
                return Err(TabulaError::backing_store(format!(
                    "quota exceeded writing '{}': {} of {} bytes",
                    key, projected, quota
                )));
            }

            write_atomic(&path, &bytes)?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.document_path(key)?;
        self.blocking(move |base_dir| {
            let _lock = lock(&base_dir)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.blocking(|base_dir| Ok(scan(&base_dir)?.into_iter().map(|(key, _)| key).collect()))
            .await
    }

    fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tabula_core::project::{NewProject, NewTab};
    use tabula_core::storage::document_size;
    use tabula_core::{StoreConfig, TabStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirBlobStore::open(temp_dir.path()).await.unwrap();

        assert!(store.get("tab_projects").await.unwrap().is_none());
        store.set("tab_projects", json!([{"id": "p1"}])).await.unwrap();
        store.set("recent_intents", json!(["Research"])).await.unwrap();

        assert_eq!(
            store.get("tab_projects").await.unwrap(),
            Some(json!([{"id": "p1"}]))
        );
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["recent_intents".to_string(), "tab_projects".to_string()]
        );

        store.remove("tab_projects").await.unwrap();
        store.remove("tab_projects").await.unwrap();
        assert!(store.get("tab_projects").await.unwrap().is_none());
        assert!(!temp_dir.path().join(".tab_projects.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirBlobStore::open(temp_dir.path()).await.unwrap();

        let err = store.set("../escape", json!(1)).await.unwrap_err();
        assert!(err.is_backing_store_failure());
    }

    #[tokio::test]
    async fn test_quota_is_enforced_and_previous_value_kept() {
        let temp_dir = TempDir::new().unwrap();
        let small = json!({"a": 1});
        let quota = document_size("k", &small) + 4;
        let store = JsonDirBlobStore::open_with_quota(temp_dir.path(), quota)
            .await
            .unwrap();

        store.set("k", small.clone()).await.unwrap();
        let err = store.set("k", json!({"a": "much longer value"})).await.unwrap_err();

        assert!(err.is_backing_store_failure());
        assert_eq!(store.get("k").await.unwrap(), Some(small));
    }

    #[tokio::test]
    async fn test_corrupt_document_surfaces_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirBlobStore::open(temp_dir.path()).await.unwrap();
        fs::write(temp_dir.path().join("tab_projects.json"), "{not json").unwrap();

        let err = store.get("tab_projects").await.unwrap_err();
        assert!(err.is_backing_store_failure());
    }

    #[tokio::test]
    async fn test_store_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let project_id = {
            let blob = Arc::new(JsonDirBlobStore::open(temp_dir.path()).await.unwrap());
            let store = TabStore::new(blob, StoreConfig::default());
            let project = store
                .add_project(NewProject::new("Job Search", "Job Search"))
                .await
                .unwrap();
            store
                .add_tab_to_project(&project.id, NewTab::new("LinkedIn", "https://linkedin.com/jobs"))
                .await
                .unwrap();
            store.mark_session_active().await.unwrap();
            project.id
        };

        let blob = Arc::new(JsonDirBlobStore::open(temp_dir.path()).await.unwrap());
        let store = TabStore::new(blob, StoreConfig::default());

        assert!(store.check_previous_session_crashed().await.unwrap());
        let projects = store.get_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, project_id);
        assert_eq!(projects[0].tabs.len(), 1);

        let usage = store.get_storage_usage().await.unwrap();
        assert!(usage.projects > 0);
        assert!(usage.other > 0);
    }
}
