use super::{Context, emit};
use anyhow::Result;
use tabula_core::TabulaError;

pub async fn usage(ctx: &Context) -> Result<bool> {
    emit(ctx.store.get_storage_usage().await)
}

pub async fn recommendations(ctx: &Context) -> Result<bool> {
    emit(ctx.store.get_storage_recommendations().await)
}

pub async fn intents(ctx: &Context) -> Result<bool> {
    emit(ctx.store.get_recent_intents().await)
}

pub async fn add_intent(ctx: &Context, intent: &str) -> Result<bool> {
    emit(ctx.store.add_recent_intent(intent).await)
}

pub async fn settings(ctx: &Context) -> Result<bool> {
    emit(ctx.store.get_settings().await)
}

pub async fn save_settings(ctx: &Context, json: &str) -> Result<bool> {
    let result = match serde_json::from_str(json) {
        Ok(settings) => ctx.store.save_settings(settings).await,
        Err(e) => Err(TabulaError::from(e)),
    };
    emit(result)
}
