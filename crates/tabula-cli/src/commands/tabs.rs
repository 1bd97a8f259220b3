use super::{Context, emit};
use anyhow::Result;
use tabula_core::project::NewTab;

pub async fn add(
    ctx: &Context,
    project_id: &str,
    url: String,
    title: Option<String>,
    favicon: Option<String>,
) -> Result<bool> {
    let title = title.unwrap_or_else(|| url.clone());
    let mut data = NewTab::new(title, url);
    if let Some(favicon) = favicon {
        data = data.with_favicon(favicon);
    }
    emit(ctx.store.add_tab_to_project(project_id, data).await)
}

pub async fn remove(ctx: &Context, project_id: &str, tab_id: &str) -> Result<bool> {
    emit(ctx.store.remove_tab_from_project(project_id, tab_id).await)
}

pub async fn undo(ctx: &Context, project_id: &str, tab_id: &str) -> Result<bool> {
    emit(ctx.store.undo_remove_tab(project_id, tab_id).await)
}

pub async fn search(ctx: &Context, query: &str) -> Result<bool> {
    emit(ctx.store.search_tabs(query).await)
}

pub async fn cleanup(ctx: &Context, force: bool) -> Result<bool> {
    if force {
        emit(ctx.store.permanently_delete_removed_tabs().await)
    } else {
        emit(ctx.store.cleanup_removed_tabs().await)
    }
}
