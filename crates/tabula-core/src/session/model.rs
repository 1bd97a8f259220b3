//! Session snapshot and crash-marker models.
//!
//! Snapshots are immutable full copies of the project collection used to
//! recover from crashes; the session state marker tells a fresh process
//! whether the previous one shut down cleanly.

use crate::project::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotType {
    /// Requested by the user
    Manual,
    /// Taken at startup or by the interval timer
    Auto,
    /// Taken when the UI was hidden and may be closing
    PreClose,
}

impl std::fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SnapshotType::Manual => "manual",
            SnapshotType::Auto => "auto",
            SnapshotType::PreClose => "pre-close",
        };
        f.write_str(label)
    }
}

/// An immutable copy of the project collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub snapshot_type: SnapshotType,
    pub projects: Vec<Project>,
    /// Active tabs at snapshot time
    pub tab_count: usize,
    /// Projects with at least one active tab at snapshot time
    pub project_count: usize,
}

impl SessionSnapshot {
    pub fn capture(projects: &[Project], snapshot_type: SnapshotType, now: DateTime<Utc>) -> Self {
        let tab_count = projects.iter().map(Project::active_tab_count).sum();
        let project_count = projects.iter().filter(|p| !p.is_logically_empty()).count();
        let suffix = Uuid::new_v4().simple().to_string();

        Self {
            id: format!("snapshot-{}-{}", now.timestamp_millis(), &suffix[..8]),
            timestamp: now,
            snapshot_type,
            projects: projects.to_vec(),
            tab_count,
            project_count,
        }
    }
}

/// Result of a snapshot request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "snapshot", rename_all = "kebab-case")]
pub enum SnapshotOutcome {
    Created(SessionSnapshot),
    /// The project collection was empty; nothing was written.
    NothingToBackUp,
}

impl SnapshotOutcome {
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match self {
            SnapshotOutcome::Created(snapshot) => Some(snapshot),
            SnapshotOutcome::NothingToBackUp => None,
        }
    }
}

/// Crash-detection marker persisted under `session_state`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub active: bool,
    #[serde(default)]
    pub closed_normally: bool,
    pub last_update: DateTime<Utc>,
}

impl SessionState {
    pub fn opened(now: DateTime<Utc>) -> Self {
        Self {
            active: true,
            closed_normally: false,
            last_update: now,
        }
    }

    pub fn closed(now: DateTime<Utc>) -> Self {
        Self {
            active: false,
            closed_normally: true,
            last_update: now,
        }
    }

    /// The previous session was open and never reported a clean shutdown.
    pub fn indicates_crash(&self) -> bool {
        self.active && !self.closed_normally
    }
}
