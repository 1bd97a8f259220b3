//! Project and tab domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single captured browsing entry.
///
/// `removed_at` is present exactly when `removed` is true. The soft-delete
/// flag can only be flipped through [`Tab::mark_removed`] and
/// [`Tab::restore`], which keep both fields in step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique within the parent project, stable across remove/restore
    pub id: String,
    pub title: String,
    /// Dedup key when capturing new tabs
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Capture time
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    removed_at: Option<DateTime<Utc>>,
}

impl Tab {
    pub fn new(data: NewTab, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: data.title,
            url: data.url,
            favicon: data.favicon,
            timestamp: now,
            removed: false,
            removed_at: None,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_active(&self) -> bool {
        !self.removed
    }

    pub fn removed_at(&self) -> Option<DateTime<Utc>> {
        self.removed_at
    }

    /// Active → Removed. Returns false if the tab was already removed.
    pub fn mark_removed(&mut self, now: DateTime<Utc>) -> bool {
        if self.removed {
            return false;
        }
        self.removed = true;
        self.removed_at = Some(now);
        true
    }

    /// Removed → Active. Returns false if the tab was not removed.
    pub fn restore(&mut self) -> bool {
        if !self.removed {
            return false;
        }
        self.removed = false;
        self.removed_at = None;
        true
    }

    /// Whether the tab was removed and its grace window has fully elapsed.
    ///
    /// A window reaching past the representable range never elapses.
    pub fn is_expired(&self, now: DateTime<Utc>, grace_window: chrono::Duration) -> bool {
        match (self.removed, self.removed_at) {
            (true, Some(at)) => at
                .checked_add_signed(grace_window)
                .is_some_and(|end| end <= now),
            // A removed flag without a timestamp comes from a hand-edited
            // document; nothing can be restored against it.
            (true, None) => true,
            (false, _) => false,
        }
    }

    /// Re-establishes `removed_at <=> removed` on documents loaded from disk.
    pub(crate) fn normalize(&mut self) {
        if !self.removed {
            self.removed_at = None;
        }
    }
}

/// Input for a new tab; id and capture time are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTab {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl NewTab {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            favicon: None,
        }
    }

    pub fn with_favicon(mut self, favicon: impl Into<String>) -> Self {
        self.favicon = Some(favicon.into());
        self
    }
}

/// A user-visible cluster of tabs sharing an intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Clustering key used to merge newly captured tabs
    #[serde(default)]
    pub intent: String,
    pub created_at: DateTime<Utc>,
    /// Insertion order is recency within the project
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

impl Project {
    pub fn new(data: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: data.title,
            subtitle: data.subtitle,
            intent: data.intent,
            created_at: now,
            tabs: Vec::new(),
        }
    }

    pub fn active_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter().filter(|tab| tab.is_active())
    }

    pub fn active_tab_count(&self) -> usize {
        self.active_tabs().count()
    }

    pub fn removed_tab_count(&self) -> usize {
        self.tabs.iter().filter(|tab| tab.is_removed()).count()
    }

    /// A project without active tabs has no content to show or count.
    pub fn is_logically_empty(&self) -> bool {
        self.active_tab_count() == 0
    }

    pub fn find_tab_mut(&mut self, tab_id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == tab_id)
    }

    /// Copy of the project with removed tabs filtered out, as rendered.
    pub fn active_view(&self) -> Project {
        Project {
            tabs: self.active_tabs().cloned().collect(),
            ..self.clone()
        }
    }

    pub fn section(&self, now: DateTime<Utc>) -> Section {
        Section::for_timestamp(self.created_at, now)
    }

    pub(crate) fn normalize(&mut self) {
        for tab in &mut self.tabs {
            tab.normalize();
        }
    }
}

/// Input for a new project; id and creation time are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub intent: String,
}

impl NewProject {
    pub fn new(title: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            intent: intent.into(),
        }
    }
}

/// Partial update for a project. `None` leaves the field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl ProjectUpdate {
    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(subtitle) = self.subtitle {
            project.subtitle = subtitle;
        }
        if let Some(intent) = self.intent {
            project.intent = intent;
        }
    }
}

/// Render bucket derived from a project's creation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Today,
    #[serde(rename = "last-7-days")]
    Last7Days,
    Older,
}

impl Section {
    /// Buckets by calendar day (UTC): same day, within the last 7 days, older.
    pub fn for_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now.date_naive() - timestamp.date_naive()).num_days();
        if days <= 0 {
            Section::Today
        } else if days <= 7 {
            Section::Last7Days
        } else {
            Section::Older
        }
    }
}
