//! Input shapes for capturing classified tabs.
//!
//! The intent classifier lives outside the store. Its batch output maps an
//! intent label to indices into the candidate tab list; this module turns
//! that mapping into groups the store can merge.

use super::model::NewTab;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tabs the classifier assigned to one intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTabs {
    pub intent: String,
    pub tabs: Vec<NewTab>,
}

impl ClassifiedTabs {
    pub fn new(intent: impl Into<String>, tabs: Vec<NewTab>) -> Self {
        Self {
            intent: intent.into(),
            tabs,
        }
    }

    /// Builds groups from a `{intent: [tab indices]}` mapping.
    ///
    /// Out-of-range indices are dropped, and an index claimed by more than
    /// one intent goes to the first intent (in label order) that lists it.
    pub fn from_index_map(candidates: &[NewTab], mapping: &BTreeMap<String, Vec<usize>>) -> Vec<Self> {
        let mut claimed = vec![false; candidates.len()];
        let mut groups = Vec::new();

        for (intent, indices) in mapping {
            let mut tabs = Vec::new();
            for &index in indices {
                match claimed.get_mut(index) {
                    Some(taken) if !*taken => {
                        *taken = true;
                        tabs.push(candidates[index].clone());
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!(intent = %intent, index, "Classifier returned out-of-range tab index");
                    }
                }
            }
            if !tabs.is_empty() {
                groups.push(Self::new(intent.clone(), tabs));
            }
        }

        groups
    }
}

/// Normalized form of an intent used for merge lookups.
pub(crate) fn intent_key(intent: &str) -> String {
    intent.trim().to_lowercase()
}

/// Outcome of [`crate::store::TabStore::capture_tabs`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    /// Ids of projects created for previously unseen intents
    pub created_projects: Vec<String>,
    /// Ids of existing projects that received tabs
    pub merged_projects: Vec<String>,
    pub added_tabs: usize,
    /// Tabs skipped because their URL is already captured
    pub skipped_duplicates: usize,
    /// Tabs skipped because their group had a blank intent
    #[serde(default)]
    pub skipped_unclassified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_map_groups_and_drops_bad_indices() {
        let candidates = vec![
            NewTab::new("LinkedIn", "https://linkedin.com/jobs"),
            NewTab::new("Indeed", "https://indeed.com"),
            NewTab::new("Rust Book", "https://doc.rust-lang.org/book"),
        ];
        let mut mapping = BTreeMap::new();
        mapping.insert("Job Search".to_string(), vec![0, 1, 7]);
        mapping.insert("Learning Rust".to_string(), vec![2, 0]);
        mapping.insert("Nothing".to_string(), vec![]);

        let groups = ClassifiedTabs::from_index_map(&candidates, &mapping);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].intent, "Job Search");
        assert_eq!(groups[0].tabs.len(), 2);
        assert_eq!(groups[1].intent, "Learning Rust");
        assert_eq!(groups[1].tabs, vec![candidates[2].clone()]);
    }

    #[test]
    fn test_intent_key_is_case_and_space_insensitive() {
        assert_eq!(intent_key("  Job Search "), intent_key("job search"));
    }
}
