//! Session snapshots, restore and the crash marker.

use super::TabStore;
use crate::error::{Result, TabulaError};
use crate::project::Project;
use crate::session::{SessionSnapshot, SessionState, SnapshotOutcome, SnapshotType};
use crate::storage::keys;

impl TabStore {
    /// Copies the current project collection into a new snapshot.
    ///
    /// The snapshot list is kept newest-first by timestamp and capped at
    /// the configured retention. `last_session` always receives the new
    /// snapshot, independent of the cap.
    pub async fn create_session_snapshot(&self, snapshot_type: SnapshotType) -> Result<SnapshotOutcome> {
        let _gate = self.write_gate().await;
        let projects = self.load_projects().await?;
        if projects.is_empty() {
            tracing::debug!(%snapshot_type, "Skipping snapshot: no projects");
            return Ok(SnapshotOutcome::NothingToBackUp);
        }

        let snapshot = SessionSnapshot::capture(&projects, snapshot_type, self.now());

        let mut snapshots = self.get_session_snapshots().await?;
        snapshots.insert(0, snapshot.clone());
        newest_first(&mut snapshots);
        snapshots.truncate(self.config().snapshot_retention);

        // The recovery pointer goes first: if the list write fails, the
        // list is untouched and `last_session` still holds the newest copy.
        self.save(keys::LAST_SESSION, &snapshot).await?;
        self.save(keys::SESSION_SNAPSHOTS, &snapshots).await?;

        tracing::info!(
            snapshot_id = %snapshot.id,
            %snapshot_type,
            projects = snapshot.project_count,
            tabs = snapshot.tab_count,
            "Created session snapshot"
        );
        Ok(SnapshotOutcome::Created(snapshot))
    }

    /// Stored snapshots, newest first.
    pub async fn get_session_snapshots(&self) -> Result<Vec<SessionSnapshot>> {
        Ok(self
            .load_lenient::<Vec<SessionSnapshot>>(keys::SESSION_SNAPSHOTS)
            .await?
            .unwrap_or_default())
    }

    /// The most recent snapshot ever taken, even if evicted from the list.
    pub async fn get_last_session(&self) -> Result<Option<SessionSnapshot>> {
        self.load_lenient(keys::LAST_SESSION).await
    }

    /// Replaces the whole project collection with a snapshot's copy.
    ///
    /// Projects created after the snapshot are lost; callers confirm first.
    pub async fn restore_session(&self, snapshot_id: &str) -> Result<Vec<Project>> {
        let _gate = self.write_gate().await;

        let listed = self
            .get_session_snapshots()
            .await?
            .into_iter()
            .find(|s| s.id == snapshot_id);
        let snapshot = match listed {
            Some(snapshot) => snapshot,
            None => self
                .get_last_session()
                .await?
                .filter(|s| s.id == snapshot_id)
                .ok_or_else(|| TabulaError::not_found("snapshot", snapshot_id))?,
        };

        let mut projects = snapshot.projects;
        for project in &mut projects {
            project.normalize();
        }
        self.save_projects(&projects).await?;

        tracing::info!(snapshot_id, projects = projects.len(), "Restored session from snapshot");
        Ok(projects)
    }

    /// Deletes one snapshot from the list. Absent ids are a no-op.
    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let _gate = self.write_gate().await;
        let mut snapshots = self.get_session_snapshots().await?;

        let before = snapshots.len();
        snapshots.retain(|s| s.id != snapshot_id);
        if snapshots.len() != before {
            self.save(keys::SESSION_SNAPSHOTS, &snapshots).await?;
        }
        Ok(())
    }

    /// Keeps the newest `keep_count` snapshots by timestamp. Returns how
    /// many were deleted.
    pub async fn cleanup_old_snapshots(&self, keep_count: usize) -> Result<usize> {
        let _gate = self.write_gate().await;
        let mut snapshots = self.get_session_snapshots().await?;

        newest_first(&mut snapshots);
        let deleted = snapshots.len().saturating_sub(keep_count);
        if deleted > 0 {
            snapshots.truncate(keep_count);
            self.save(keys::SESSION_SNAPSHOTS, &snapshots).await?;
            tracing::info!(deleted, kept = snapshots.len(), "Deleted old snapshots");
        }
        Ok(deleted)
    }

    pub async fn mark_session_active(&self) -> Result<()> {
        let _gate = self.write_gate().await;
        self.save(keys::SESSION_STATE, &SessionState::opened(self.now())).await
    }

    pub async fn mark_session_closed(&self) -> Result<()> {
        let _gate = self.write_gate().await;
        self.save(keys::SESSION_STATE, &SessionState::closed(self.now())).await
    }

    /// Whether the previous session was left open without a clean close.
    ///
    /// Must run before [`Self::mark_session_active`] overwrites the marker.
    pub async fn check_previous_session_crashed(&self) -> Result<bool> {
        let crashed = self
            .load_lenient::<SessionState>(keys::SESSION_STATE)
            .await?
            .is_some_and(|state| state.indicates_crash());
        if crashed {
            tracing::warn!("Previous session did not close normally");
        }
        Ok(crashed)
    }
}

/// Stable sort, so snapshots sharing a timestamp keep insertion order.
fn newest_first(snapshots: &mut [SessionSnapshot]) {
    snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use crate::project::{NewProject, NewTab};
    use crate::session::{SessionState, SnapshotOutcome, SnapshotType};
    use crate::storage::{BlobStore, keys};
    use crate::store::test_support::{Fixture, fixture};
    use chrono::{Duration, Utc};

    async fn seed(f: &Fixture, title: &str) -> String {
        let project = f.store.add_project(NewProject::new(title, title)).await.unwrap();
        f.store
            .add_tab_to_project(&project.id, NewTab::new(title, format!("https://{title}")))
            .await
            .unwrap();
        project.id
    }

    #[tokio::test]
    async fn test_empty_collection_has_nothing_to_back_up() {
        let f = fixture();
        let outcome = f.store.create_session_snapshot(SnapshotType::Manual).await.unwrap();

        assert_eq!(outcome, SnapshotOutcome::NothingToBackUp);
        assert!(f.store.get_session_snapshots().await.unwrap().is_empty());
        assert!(f.store.get_last_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_retention_keeps_ten_most_recent() {
        let f = fixture();
        seed(&f, "a").await;

        let mut created = Vec::new();
        for _ in 0..15 {
            f.clock.advance(Duration::seconds(1));
            let outcome = f.store.create_session_snapshot(SnapshotType::Auto).await.unwrap();
            created.push(outcome.snapshot().unwrap().id.clone());
        }

        let ids: Vec<String> = f
            .store
            .get_session_snapshots()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        let expected: Vec<String> = created.iter().rev().take(10).cloned().collect();
        assert_eq!(ids, expected);

        let last = f.store.get_last_session().await.unwrap().unwrap();
        assert_eq!(last.id, created[14]);
    }

    #[tokio::test]
    async fn test_same_instant_snapshots_stay_newest_first() {
        let f = fixture();
        seed(&f, "a").await;

        let first = f.store.create_session_snapshot(SnapshotType::Manual).await.unwrap();
        let second = f.store.create_session_snapshot(SnapshotType::Manual).await.unwrap();

        let snapshots = f.store.get_session_snapshots().await.unwrap();
        assert_eq!(snapshots[0].id, second.snapshot().unwrap().id);
        assert_eq!(snapshots[1].id, first.snapshot().unwrap().id);
    }

    #[tokio::test]
    async fn test_restore_is_a_full_replace() {
        let f = fixture();
        let kept = seed(&f, "before").await;
        let snapshot = f
            .store
            .create_session_snapshot(SnapshotType::Manual)
            .await
            .unwrap()
            .snapshot()
            .cloned()
            .unwrap();

        seed(&f, "after").await;
        f.store.delete_project(&kept).await.unwrap();

        let restored = f.store.restore_session(&snapshot.id).await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, kept);
        assert_eq!(f.store.get_projects().await.unwrap(), snapshot.projects);

        let err = f.store.restore_session("snapshot-0-missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_restore_from_last_session_after_eviction() {
        let f = fixture();
        seed(&f, "a").await;
        let snapshot = f
            .store
            .create_session_snapshot(SnapshotType::PreClose)
            .await
            .unwrap()
            .snapshot()
            .cloned()
            .unwrap();
        f.store.delete_snapshot(&snapshot.id).await.unwrap();
        f.store.delete_snapshot(&snapshot.id).await.unwrap();
        assert!(f.store.get_session_snapshots().await.unwrap().is_empty());

        let restored = f.store.restore_session(&snapshot.id).await.unwrap();
        assert_eq!(restored, snapshot.projects);
    }

    #[tokio::test]
    async fn test_failed_list_write_keeps_last_session_current() {
        let sized = fixture();
        seed(&sized, "a").await;
        sized.store.create_session_snapshot(SnapshotType::Manual).await.unwrap();
        let full = sized.store.get_storage_usage().await.unwrap().total;

        let f = fixture();
        seed(&f, "a").await;
        f.blob.set_quota(full - 1);

        let err = f
            .store
            .create_session_snapshot(SnapshotType::Manual)
            .await
            .unwrap_err();

        assert!(err.is_backing_store_failure());
        assert!(f.store.get_session_snapshots().await.unwrap().is_empty());
        assert!(f.store.get_last_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_old_snapshots_keeps_latest_timestamp() {
        let f = fixture();
        seed(&f, "a").await;
        let mut latest = None;
        for _ in 0..3 {
            f.clock.advance(Duration::minutes(1));
            latest = f
                .store
                .create_session_snapshot(SnapshotType::Manual)
                .await
                .unwrap()
                .snapshot()
                .cloned();
        }

        let deleted = f.store.cleanup_old_snapshots(1).await.unwrap();

        assert_eq!(deleted, 2);
        let remaining = f.store.get_session_snapshots().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, latest.unwrap().id);
        assert_eq!(f.store.cleanup_old_snapshots(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_crash_detection() {
        let f = fixture();
        assert!(!f.store.check_previous_session_crashed().await.unwrap());

        let crashed = SessionState {
            active: true,
            closed_normally: false,
            last_update: Utc::now(),
        };
        f.blob
            .set(keys::SESSION_STATE, serde_json::to_value(&crashed).unwrap())
            .await
            .unwrap();
        assert!(f.store.check_previous_session_crashed().await.unwrap());

        let clean = SessionState {
            active: false,
            closed_normally: true,
            last_update: Utc::now(),
        };
        f.blob
            .set(keys::SESSION_STATE, serde_json::to_value(&clean).unwrap())
            .await
            .unwrap();
        assert!(!f.store.check_previous_session_crashed().await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_active_then_closed() {
        let f = fixture();
        f.store.mark_session_active().await.unwrap();
        assert!(f.store.check_previous_session_crashed().await.unwrap());

        f.store.mark_session_closed().await.unwrap();
        assert!(!f.store.check_previous_session_crashed().await.unwrap());
    }
}
