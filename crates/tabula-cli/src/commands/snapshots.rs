use super::{Context, emit};
use anyhow::Result;
use tabula_core::session::SnapshotType;

pub async fn create(ctx: &Context, snapshot_type: SnapshotType) -> Result<bool> {
    emit(ctx.store.create_session_snapshot(snapshot_type).await)
}

pub async fn list(ctx: &Context) -> Result<bool> {
    emit(ctx.store.get_session_snapshots().await)
}

pub async fn restore(ctx: &Context, snapshot_id: &str) -> Result<bool> {
    emit(ctx.store.restore_session(snapshot_id).await)
}

pub async fn delete(ctx: &Context, snapshot_id: &str) -> Result<bool> {
    emit(ctx.store.delete_snapshot(snapshot_id).await)
}

pub async fn prune(ctx: &Context, keep: usize) -> Result<bool> {
    emit(ctx.store.cleanup_old_snapshots(keep).await)
}
