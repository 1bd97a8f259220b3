//! Store policy configuration.
//!
//! Every knob here is policy, not structure: the store behaves correctly
//! with any positive value.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default storage quota of the host substrate (5 MiB).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Upper bound for the scheduler intervals (one year).
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// How long a removed tab stays restorable before cleanup purges it.
    pub grace_window_secs: u64,
    /// Interval between automatic snapshots.
    pub snapshot_interval_secs: u64,
    /// Interval between background purge passes.
    pub cleanup_interval_secs: u64,
    /// Maximum number of snapshots kept in `session_snapshots`.
    pub snapshot_retention: usize,
    /// Maximum number of entries kept in `recent_intents`.
    pub recent_intent_limit: usize,
    pub quota_bytes: u64,
    pub recommendations: RecommendationThresholds,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            grace_window_secs: 4,
            snapshot_interval_secs: 5 * 60,
            cleanup_interval_secs: 5,
            snapshot_retention: 10,
            recent_intent_limit: 10,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            recommendations: RecommendationThresholds::default(),
        }
    }
}

impl StoreConfig {
    /// Grace window as a signed duration, saturating at `Duration::MAX`.
    pub fn grace_window(&self) -> chrono::Duration {
        i64::try_from(self.grace_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Clamped to `1..=MAX_INTERVAL_SECS`.
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }

    /// Clamped to `1..=MAX_INTERVAL_SECS`.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

/// Thresholds for [`crate::usage::recommend`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Snapshot count above which oversized snapshot storage is reported.
    pub snapshot_count: usize,
    /// Removed-but-unpurged tab count above which a purge is suggested.
    pub removed_tabs: usize,
    /// Overall quota percentage above which cleanup is suggested.
    pub usage_percentage: f64,
    /// Project count above which archiving is suggested.
    pub project_count: usize,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            snapshot_count: 5,
            removed_tabs: 20,
            usage_percentage: 75.0,
            project_count: 50,
        }
    }
}
