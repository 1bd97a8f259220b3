//! Project and tab CRUD, search and classified capture.

use super::TabStore;
use crate::error::{Result, TabulaError};
use crate::project::capture::intent_key;
use crate::project::{
    CaptureReport, ClassifiedTabs, NewProject, NewTab, Project, ProjectUpdate, Tab,
};
use serde::Serialize;
use std::collections::HashSet;

/// A search match: the tab and the project holding it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabHit {
    pub project_id: String,
    pub project_title: String,
    pub tab: Tab,
}

impl TabStore {
    /// Returns the full project collection, removed tabs included.
    ///
    /// An absent collection reads as empty.
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        self.load_projects().await
    }

    /// Returns projects as they should be rendered: removed tabs filtered
    /// out and logically empty projects dropped.
    pub async fn get_active_projects(&self) -> Result<Vec<Project>> {
        Ok(self
            .load_projects()
            .await?
            .iter()
            .filter(|project| !project.is_logically_empty())
            .map(Project::active_view)
            .collect())
    }

    /// Appends a new, empty project. Does not deduplicate by title or intent.
    pub async fn add_project(&self, data: NewProject) -> Result<Project> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let project = Project::new(data, self.now());
        projects.push(project.clone());
        self.save_projects(&projects).await?;

        tracing::debug!(project_id = %project.id, title = %project.title, "Added project");
        Ok(project)
    }

    /// Merges the given fields into a project.
    pub async fn update_project(&self, project_id: &str, update: ProjectUpdate) -> Result<Project> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| TabulaError::not_found("project", project_id))?;
        update.apply(project);
        let updated = project.clone();

        self.save_projects(&projects).await?;
        Ok(updated)
    }

    /// Deletes a project. Deleting an absent id succeeds without writing.
    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let before = projects.len();
        projects.retain(|p| p.id != project_id);
        if projects.len() == before {
            return Ok(());
        }

        self.save_projects(&projects).await?;
        tracing::debug!(project_id, "Deleted project");
        Ok(())
    }

    /// Appends a freshly captured tab to a project.
    pub async fn add_tab_to_project(&self, project_id: &str, data: NewTab) -> Result<Tab> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;

        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| TabulaError::not_found("project", project_id))?;
        let tab = Tab::new(data, self.now());
        project.tabs.push(tab.clone());

        self.save_projects(&projects).await?;
        tracing::debug!(project_id, tab_id = %tab.id, "Added tab");
        Ok(tab)
    }

    /// Case-insensitive substring search over active tab titles and URLs.
    pub async fn search_tabs(&self, query: &str) -> Result<Vec<TabHit>> {
        let needle = query.trim().to_lowercase();
        let projects = self.load_projects().await?;

        let mut hits = Vec::new();
        for project in &projects {
            for tab in project.active_tabs() {
                let matches = needle.is_empty()
                    || tab.title.to_lowercase().contains(&needle)
                    || tab.url.to_lowercase().contains(&needle);
                if matches {
                    hits.push(TabHit {
                        project_id: project.id.clone(),
                        project_title: project.title.clone(),
                        tab: tab.clone(),
                    });
                }
            }
        }
        Ok(hits)
    }

    /// Files classified tabs into projects.
    ///
    /// Groups with a blank intent are skipped. Tabs whose URL is already
    /// captured as an active tab are skipped.
    /// Each group merges into the first project with the same intent
    /// (trimmed, case-insensitive) or becomes a new project titled by the
    /// intent. Projects are written once per batch.
    pub async fn capture_tabs(&self, groups: Vec<ClassifiedTabs>) -> Result<CaptureReport> {
        let _gate = self.write_gate().await;
        let mut projects = self.load_projects().await?;
        let now = self.now();

        let mut seen_urls: HashSet<String> = projects
            .iter()
            .flat_map(|p| p.active_tabs().map(|t| t.url.clone()))
            .collect();
        let mut report = CaptureReport::default();
        let mut captured_intents = Vec::new();

        for group in groups {
            if group.intent.trim().is_empty() {
                tracing::warn!(tabs = group.tabs.len(), "Skipping tabs with a blank intent");
                report.skipped_unclassified += group.tabs.len();
                continue;
            }

            let fresh: Vec<NewTab> = group
                .tabs
                .into_iter()
                .filter(|tab| {
                    let new = seen_urls.insert(tab.url.clone());
                    if !new {
                        report.skipped_duplicates += 1;
                    }
                    new
                })
                .collect();
            if fresh.is_empty() {
                continue;
            }

            let key = intent_key(&group.intent);
            let index = match projects.iter().position(|p| intent_key(&p.intent) == key) {
                Some(index) => {
                    if !report.merged_projects.contains(&projects[index].id)
                        && !report.created_projects.contains(&projects[index].id)
                    {
                        report.merged_projects.push(projects[index].id.clone());
                    }
                    index
                }
                None => {
                    let project = Project::new(
                        NewProject::new(group.intent.trim(), group.intent.trim()),
                        now,
                    );
                    report.created_projects.push(project.id.clone());
                    projects.push(project);
                    projects.len() - 1
                }
            };

            report.added_tabs += fresh.len();
            projects[index]
                .tabs
                .extend(fresh.into_iter().map(|tab| Tab::new(tab, now)));
            captured_intents.push(group.intent);
        }

        if report.added_tabs > 0 {
            self.save_projects(&projects).await?;
            if let Err(e) = self.record_intents(&captured_intents).await {
                tracing::warn!("Failed to record captured intents: {}", e);
            }
            tracing::info!(
                added = report.added_tabs,
                created = report.created_projects.len(),
                merged = report.merged_projects.len(),
                skipped = report.skipped_duplicates,
                "Captured tabs"
            );
        }

        Ok(report)
    }
}
