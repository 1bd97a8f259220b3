//! Soft-delete, undo and purge of tabs.
//!
//! A tab moves Active → Removed on removal and stays addressable so the
//! removal can be undone. Once its grace window has elapsed, cleanup purges
//! it for good; purged tabs are never resurrected.

use super::TabStore;
use crate::error::{Result, TabulaError};
use crate::project::{Project, Tab};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a purge pass removed.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub purged_tabs: usize,
    pub pruned_projects: usize,
}

impl CleanupReport {
    pub fn is_noop(&self) -> bool {
        self.purged_tabs == 0 && self.pruned_projects == 0
    }
}

impl TabStore {
    /// Soft-deletes a tab, starting its grace window.
    pub async fn remove_tab_from_project(&self, project_id: &str, tab_id: &str) -> Result<Tab> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;
        let now = self.now();

        let tab = find_tab(&mut projects, project_id, tab_id)?;
        if !tab.mark_removed(now) {
            return Err(TabulaError::invalid_state(format!(
                "tab '{}' is already removed",
                tab_id
            )));
        }
        let removed = tab.clone();

        self.save_projects(&projects).await?;
        tracing::debug!(project_id, tab_id, "Removed tab (undo available)");
        Ok(removed)
    }

    /// Restores a removed tab that has not been purged yet.
    pub async fn undo_remove_tab(&self, project_id: &str, tab_id: &str) -> Result<Tab> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let tab = find_tab(&mut projects, project_id, tab_id)?;
        if !tab.restore() {
            return Err(TabulaError::invalid_state(format!(
                "tab '{}' is not removed",
                tab_id
            )));
        }
        let restored = tab.clone();

        self.save_projects(&projects).await?;
        tracing::debug!(project_id, tab_id, "Restored tab");
        Ok(restored)
    }

    /// Purges removed tabs whose grace window has elapsed, then prunes
    /// projects left with nothing active or restorable.
    ///
    /// Writes only when something was purged or pruned.
    pub async fn cleanup_removed_tabs(&self) -> Result<CleanupReport> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;
        let now = self.now();
        let grace = self.config().grace_window();

        let report = sweep(&mut projects, |tab| tab.is_expired(now, grace), |project| {
            project.is_logically_empty() && !has_restorable_tab(project, now, grace)
        });

        if !report.is_noop() {
            self.save_projects(&projects).await?;
            tracing::info!(
                purged_tabs = report.purged_tabs,
                pruned_projects = report.pruned_projects,
                "Purged expired tabs"
            );
        }
        Ok(report)
    }

    /// Purges every removed tab regardless of its grace window and prunes
    /// projects left without active tabs. Returns the number of purged tabs.
    pub async fn permanently_delete_removed_tabs(&self) -> Result<usize> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let report = sweep(&mut projects, Tab::is_removed, Project::is_logically_empty);

        if !report.is_noop() {
            self.save_projects(&projects).await?;
            tracing::info!(
                purged_tabs = report.purged_tabs,
                pruned_projects = report.pruned_projects,
                "Permanently deleted removed tabs"
            );
        }
        Ok(report.purged_tabs)
    }
}

fn find_tab<'a>(projects: &'a mut [Project], project_id: &str, tab_id: &str) -> Result<&'a mut Tab> {
    projects
        .iter_mut()
        .find(|p| p.id == project_id)
        .ok_or_else(|| TabulaError::not_found("project", project_id))?
        .find_tab_mut(tab_id)
        .ok_or_else(|| TabulaError::not_found("tab", tab_id))
}

fn has_restorable_tab(project: &Project, now: DateTime<Utc>, grace: chrono::Duration) -> bool {
    project
        .tabs
        .iter()
        .any(|tab| tab.is_removed() && !tab.is_expired(now, grace))
}

/// Drops tabs matching `purge`, then projects matching `prune`.
fn sweep(
    projects: &mut Vec<Project>,
    purge: impl Fn(&Tab) -> bool,
    prune: impl Fn(&Project) -> bool,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    for project in projects.iter_mut() {
        let before = project.tabs.len();
        project.tabs.retain(|tab| !purge(tab));
        report.purged_tabs += before - project.tabs.len();
    }

    let before = projects.len();
    projects.retain(|project| !prune(project));
    report.pruned_projects = before - projects.len();

    report
}

#[cfg(test)]
mod tests {
    use crate::config::StoreConfig;
    use crate::project::{NewProject, NewTab};
    use crate::store::test_support::{fixture, fixture_with};
    use chrono::Duration;

    #[tokio::test]
    async fn test_remove_then_undo_is_observationally_identical() {
        let f = fixture();
        let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
        let tab = f
            .store
            .add_tab_to_project(&project.id, NewTab::new("LinkedIn", "https://linkedin.com/jobs"))
            .await
            .unwrap();
        let before = serde_json::to_value(&tab).unwrap();

        let removed = f.store.remove_tab_from_project(&project.id, &tab.id).await.unwrap();
        assert!(removed.is_removed());

        f.clock.advance(Duration::seconds(2));
        let restored = f.store.undo_remove_tab(&project.id, &tab.id).await.unwrap();

        assert_eq!(restored, tab);
        let stored = f.store.get_projects().await.unwrap()[0].tabs[0].clone();
        assert_eq!(serde_json::to_value(&stored).unwrap(), before);
    }

    #[tokio::test]
    async fn test_undo_on_active_tab_is_invalid_state() {
        let f = fixture();
        let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
        let tab = f
            .store
            .add_tab_to_project(&project.id, NewTab::new("x", "https://x"))
            .await
            .unwrap();

        let err = f.store.undo_remove_tab(&project.id, &tab.id).await.unwrap_err();
        assert!(err.is_invalid_state());

        f.store.remove_tab_from_project(&project.id, &tab.id).await.unwrap();
        let err = f
            .store
            .remove_tab_from_project(&project.id, &tab.id)
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[tokio::test]
    async fn test_remove_missing_project_or_tab() {
        let f = fixture();
        let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();

        let err = f.store.remove_tab_from_project("nope", "t").await.unwrap_err();
        assert!(err.is_not_found());
        let err = f.store.remove_tab_from_project(&project.id, "t").await.unwrap_err();
        assert!(err.is_not_found());
        let err = f.store.undo_remove_tab(&project.id, "t").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_grace_window_purge_boundary() {
        let f = fixture();
        let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
        let keep = f
            .store
            .add_tab_to_project(&project.id, NewTab::new("keep", "https://keep"))
            .await
            .unwrap();
        let tab = f
            .store
            .add_tab_to_project(&project.id, NewTab::new("x", "https://x"))
            .await
            .unwrap();
        f.store.remove_tab_from_project(&project.id, &tab.id).await.unwrap();

        f.clock.advance(Duration::milliseconds(3_999));
        let report = f.store.cleanup_removed_tabs().await.unwrap();
        assert!(report.is_noop());
        let tabs = f.store.get_projects().await.unwrap()[0].tabs.clone();
        assert_eq!(tabs.len(), 2);
        assert!(tabs[1].is_removed());

        f.clock.advance(Duration::milliseconds(1));
        let report = f.store.cleanup_removed_tabs().await.unwrap();
        assert_eq!(report.purged_tabs, 1);
        assert_eq!(report.pruned_projects, 0);
        let tabs = f.store.get_projects().await.unwrap()[0].tabs.clone();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].id, keep.id);

        let err = f.store.undo_remove_tab(&project.id, &tab.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unrepresentable_grace_window_never_expires() {
        for grace_window_secs in [u64::MAX, 10_000_000_000_000] {
            let f = fixture_with(StoreConfig {
                grace_window_secs,
                ..StoreConfig::default()
            });
            let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
            let tab = f
                .store
                .add_tab_to_project(&project.id, NewTab::new("x", "https://x"))
                .await
                .unwrap();
            f.store.remove_tab_from_project(&project.id, &tab.id).await.unwrap();

            f.clock.advance(Duration::days(365 * 100));
            assert!(f.store.cleanup_removed_tabs().await.unwrap().is_noop());
            assert!(f.store.undo_remove_tab(&project.id, &tab.id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_idle_cleanup_does_not_write() {
        let f = fixture();
        let project = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
        f.store
            .add_tab_to_project(&project.id, NewTab::new("x", "https://x"))
            .await
            .unwrap();
        let writes = f.blob.write_count();

        for _ in 0..3 {
            assert!(f.store.cleanup_removed_tabs().await.unwrap().is_noop());
        }
        assert_eq!(f.blob.write_count(), writes);
    }

    #[tokio::test]
    async fn test_job_search_scenario() {
        let f = fixture();
        let project = f
            .store
            .add_project(NewProject::new("Job Search", "Job Search"))
            .await
            .unwrap();
        assert!(project.tabs.is_empty());

        let tab = f
            .store
            .add_tab_to_project(&project.id, NewTab::new("LinkedIn", "https://linkedin.com/jobs"))
            .await
            .unwrap();
        let projects = f.store.get_projects().await.unwrap();
        assert_eq!(projects[0].active_tab_count(), 1);

        f.store.remove_tab_from_project(&project.id, &tab.id).await.unwrap();
        let projects = f.store.get_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].tabs[0].is_removed());

        f.store.cleanup_removed_tabs().await.unwrap();
        let projects = f.store.get_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].tabs.len(), 1);

        f.clock.advance(Duration::seconds(5));
        let report = f.store.cleanup_removed_tabs().await.unwrap();
        assert_eq!(report.purged_tabs, 1);
        assert_eq!(report.pruned_projects, 1);
        assert!(f.store.get_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permanent_delete_ignores_grace_window() {
        let f = fixture();
        let emptied = f.store.add_project(NewProject::new("A", "a")).await.unwrap();
        let kept = f.store.add_project(NewProject::new("B", "b")).await.unwrap();
        let a = f
            .store
            .add_tab_to_project(&emptied.id, NewTab::new("a", "https://a"))
            .await
            .unwrap();
        f.store
            .add_tab_to_project(&kept.id, NewTab::new("b1", "https://b1"))
            .await
            .unwrap();
        let b2 = f
            .store
            .add_tab_to_project(&kept.id, NewTab::new("b2", "https://b2"))
            .await
            .unwrap();
        f.store.remove_tab_from_project(&emptied.id, &a.id).await.unwrap();
        f.store.remove_tab_from_project(&kept.id, &b2.id).await.unwrap();

        let deleted = f.store.permanently_delete_removed_tabs().await.unwrap();

        assert_eq!(deleted, 2);
        let projects = f.store.get_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, kept.id);
        assert_eq!(projects[0].tabs.len(), 1);

        let writes = f.blob.write_count();
        assert_eq!(f.store.permanently_delete_removed_tabs().await.unwrap(), 0);
        assert_eq!(f.blob.write_count(), writes);
    }
}
