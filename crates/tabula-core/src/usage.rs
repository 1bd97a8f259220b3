//! Storage usage accounting and advisory recommendations.

use crate::config::RecommendationThresholds;
use crate::project::Project;
use crate::storage::keys;
use serde::{Deserialize, Serialize};

/// Health band of the substrate by quota percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageHealth {
    /// Below 50%
    Healthy,
    /// Below 75%
    Moderate,
    /// Below 90%
    High,
    Critical,
}

impl StorageHealth {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 50.0 {
            StorageHealth::Healthy
        } else if percentage < 75.0 {
            StorageHealth::Moderate
        } else if percentage < 90.0 {
            StorageHealth::High
        } else {
            StorageHealth::Critical
        }
    }
}

/// Logical category a persisted key is accounted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCategory {
    Projects,
    Snapshots,
    Settings,
    Intents,
    Other,
}

impl StorageCategory {
    pub fn for_key(key: &str) -> Self {
        match key {
            keys::PROJECTS => StorageCategory::Projects,
            keys::SESSION_SNAPSHOTS | keys::LAST_SESSION => StorageCategory::Snapshots,
            keys::USER_SETTINGS => StorageCategory::Settings,
            keys::RECENT_INTENTS => StorageCategory::Intents,
            _ => StorageCategory::Other,
        }
    }
}

/// Byte usage per category against the substrate quota.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub projects: u64,
    pub snapshots: u64,
    pub settings: u64,
    pub intents: u64,
    pub other: u64,
    pub total: u64,
    pub quota: u64,
    pub quota_percentage: f64,
    pub health: StorageHealth,
}

impl StorageUsage {
    /// Builds usage from `(key, bytes)` pairs.
    pub fn from_sizes<'a>(sizes: impl IntoIterator<Item = (&'a str, u64)>, quota: u64) -> Self {
        let mut usage = StorageUsage {
            projects: 0,
            snapshots: 0,
            settings: 0,
            intents: 0,
            other: 0,
            total: 0,
            quota,
            quota_percentage: 0.0,
            health: StorageHealth::Healthy,
        };

        for (key, bytes) in sizes {
            let bucket = match StorageCategory::for_key(key) {
                StorageCategory::Projects => &mut usage.projects,
                StorageCategory::Snapshots => &mut usage.snapshots,
                StorageCategory::Settings => &mut usage.settings,
                StorageCategory::Intents => &mut usage.intents,
                StorageCategory::Other => &mut usage.other,
            };
            *bucket += bytes;
            usage.total += bytes;
        }

        usage.quota_percentage = if usage.total == 0 || quota == 0 {
            0.0
        } else {
            usage.total as f64 / quota as f64 * 100.0
        };
        usage.health = StorageHealth::from_percentage(usage.quota_percentage);
        usage
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    PruneSnapshots,
    PurgeRemovedTabs,
    HighUsage,
    ArchiveProjects,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationLevel {
    Info,
    Warning,
}

/// An advisory message; the store never acts on these by itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub level: RecommendationLevel,
    pub message: String,
}

/// Derives recommendations from a usage report and the live projects.
pub fn recommend(
    usage: &StorageUsage,
    projects: &[Project],
    snapshot_count: usize,
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if usage.snapshots > usage.projects && snapshot_count > thresholds.snapshot_count {
        recommendations.push(Recommendation {
            kind: RecommendationKind::PruneSnapshots,
            level: RecommendationLevel::Info,
            message: format!(
                "Snapshots use more space than projects ({} snapshots). Consider keeping only the most recent ones.",
                snapshot_count
            ),
        });
    }

    let removed: usize = projects.iter().map(Project::removed_tab_count).sum();
    if removed > thresholds.removed_tabs {
        recommendations.push(Recommendation {
            kind: RecommendationKind::PurgeRemovedTabs,
            level: RecommendationLevel::Info,
            message: format!(
                "{} removed tabs are still kept for undo. Permanently delete them to free space.",
                removed
            ),
        });
    }

    if usage.quota_percentage > thresholds.usage_percentage {
        recommendations.push(Recommendation {
            kind: RecommendationKind::HighUsage,
            level: RecommendationLevel::Warning,
            message: format!(
                "Storage is {:.1}% full. Clean up old snapshots or projects.",
                usage.quota_percentage
            ),
        });
    }

    if projects.len() > thresholds.project_count {
        recommendations.push(Recommendation {
            kind: RecommendationKind::ArchiveProjects,
            level: RecommendationLevel::Info,
            message: format!(
                "You have {} projects. Consider deleting the ones you no longer need.",
                projects.len()
            ),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{NewProject, NewTab, Tab};
    use chrono::Utc;

    #[test]
    fn test_zero_total_has_zero_percentage() {
        let usage = StorageUsage::from_sizes(std::iter::empty(), 5 * 1024 * 1024);
        assert_eq!(usage.total, 0);
        assert_eq!(usage.quota_percentage, 0.0);
        assert_eq!(usage.health, StorageHealth::Healthy);

        let no_quota = StorageUsage::from_sizes([("tab_projects", 10)], 0);
        assert_eq!(no_quota.quota_percentage, 0.0);
    }

    #[test]
    fn test_categories_and_bands() {
        let usage = StorageUsage::from_sizes(
            [
                ("tab_projects", 400),
                ("session_snapshots", 200),
                ("last_session", 100),
                ("user_settings", 50),
                ("recent_intents", 30),
                ("session_state", 20),
            ],
            1000,
        );
        assert_eq!(usage.projects, 400);
        assert_eq!(usage.snapshots, 300);
        assert_eq!(usage.settings, 50);
        assert_eq!(usage.intents, 30);
        assert_eq!(usage.other, 20);
        assert_eq!(usage.total, 800);
        assert_eq!(usage.health, StorageHealth::High);

        assert_eq!(StorageHealth::from_percentage(49.9), StorageHealth::Healthy);
        assert_eq!(StorageHealth::from_percentage(50.0), StorageHealth::Moderate);
        assert_eq!(StorageHealth::from_percentage(75.0), StorageHealth::High);
        assert_eq!(StorageHealth::from_percentage(90.0), StorageHealth::Critical);
    }

    #[test]
    fn test_recommend_triggers() {
        let now = Utc::now();
        let thresholds = RecommendationThresholds::default();

        let mut cluttered = Project::new(NewProject::new("A", "a"), now);
        for i in 0..21 {
            let mut tab = Tab::new(NewTab::new(format!("t{i}"), format!("https://t/{i}")), now);
            tab.mark_removed(now);
            cluttered.tabs.push(tab);
        }
        let mut projects = vec![cluttered];
        for i in 0..50 {
            projects.push(Project::new(NewProject::new(format!("p{i}"), "x"), now));
        }

        let usage = StorageUsage::from_sizes(
            [("tab_projects", 100), ("session_snapshots", 700)],
            1000,
        );
        let kinds: Vec<_> = recommend(&usage, &projects, 6, &thresholds)
            .into_iter()
            .map(|r| r.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                RecommendationKind::PruneSnapshots,
                RecommendationKind::PurgeRemovedTabs,
                RecommendationKind::HighUsage,
                RecommendationKind::ArchiveProjects,
            ]
        );
    }

    #[test]
    fn test_recommend_quiet_store() {
        let usage = StorageUsage::from_sizes([("tab_projects", 100), ("session_snapshots", 700)], 100_000);
        let recs = recommend(&usage, &[], 5, &RecommendationThresholds::default());
        assert!(recs.is_empty());
    }
}
