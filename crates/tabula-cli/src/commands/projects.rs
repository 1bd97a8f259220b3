use super::{Context, emit};
use anyhow::Result;
use tabula_core::project::{NewProject, ProjectUpdate};

pub async fn list(ctx: &Context, active_only: bool) -> Result<bool> {
    if active_only {
        emit(ctx.store.get_active_projects().await)
    } else {
        emit(ctx.store.get_projects().await)
    }
}

pub async fn add(
    ctx: &Context,
    title: String,
    intent: Option<String>,
    subtitle: Option<String>,
) -> Result<bool> {
    let intent = intent.unwrap_or_else(|| title.clone());
    let mut data = NewProject::new(title, intent);
    if let Some(subtitle) = subtitle {
        data.subtitle = subtitle;
    }
    emit(ctx.store.add_project(data).await)
}

pub async fn rename(
    ctx: &Context,
    project_id: &str,
    title: Option<String>,
    subtitle: Option<String>,
    intent: Option<String>,
) -> Result<bool> {
    let update = ProjectUpdate {
        title,
        subtitle,
        intent,
    };
    emit(ctx.store.update_project(project_id, update).await)
}

pub async fn delete(ctx: &Context, project_id: &str) -> Result<bool> {
    emit(ctx.store.delete_project(project_id).await)
}
