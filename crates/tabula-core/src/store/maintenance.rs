//! Storage accounting and recommendations.

use super::TabStore;
use crate::error::Result;
use crate::storage::document_size;
use crate::usage::{Recommendation, StorageUsage, recommend};

impl TabStore {
    /// Measures every persisted key and classifies the total against the quota.
    pub async fn get_storage_usage(&self) -> Result<StorageUsage> {
        let mut sizes = Vec::new();
        for key in self.blob.keys().await? {
            if let Some(value) = self.blob.get(&key).await? {
                let bytes = document_size(&key, &value);
                sizes.push((key, bytes));
            }
        }

        let usage = StorageUsage::from_sizes(
            sizes.iter().map(|(key, bytes)| (key.as_str(), *bytes)),
            self.blob.quota_bytes(),
        );
        tracing::debug!(
            total = usage.total,
            percentage = usage.quota_percentage,
            "Computed storage usage"
        );
        Ok(usage)
    }

    /// Advisory messages for the current usage and project data.
    pub async fn get_storage_recommendations(&self) -> Result<Vec<Recommendation>> {
        let usage = self.get_storage_usage().await?;
        let projects = self.load_projects().await?;
        let snapshot_count = self.get_session_snapshots().await?.len();

        Ok(recommend(
            &usage,
            &projects,
            snapshot_count,
            &self.config().recommendations,
        ))
    }
}
