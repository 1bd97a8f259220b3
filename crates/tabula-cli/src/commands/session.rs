use super::{Context, emit};
use anyhow::{Context as _, Result};
use tabula_core::session::SessionScheduler;

pub async fn check(ctx: &Context) -> Result<bool> {
    emit(ctx.store.check_previous_session_crashed().await)
}

/// Without `watch` the session is left open: the next `check` reports a
/// crash unless `session close` runs first.
pub async fn open(ctx: &Context, watch: bool) -> Result<bool> {
    let mut scheduler = SessionScheduler::new(ctx.store.clone());
    let started = scheduler.start().await;
    let running = started.is_ok();
    let success = emit(started)?;

    if watch && running {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for interrupt")?;
        if let Err(e) = scheduler.notify_hidden().await {
            tracing::warn!("Pre-close snapshot failed: {}", e);
        }
        scheduler.stop().await?;
    }

    Ok(success)
}

pub async fn close(ctx: &Context) -> Result<bool> {
    emit(ctx.store.mark_session_closed().await)
}
