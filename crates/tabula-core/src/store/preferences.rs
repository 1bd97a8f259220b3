//! Recent intents and free-form user settings.

use super::TabStore;
use crate::error::{Result, TabulaError};
use crate::storage::keys;
use serde_json::{Map, Value};

impl TabStore {
    /// Recently used intents, most recent first.
    pub async fn get_recent_intents(&self) -> Result<Vec<String>> {
        Ok(self
            .load_lenient::<Vec<String>>(keys::RECENT_INTENTS)
            .await?
            .unwrap_or_default())
    }

    /// Moves `intent` to the front of the recent list. Blank input is ignored.
    pub async fn add_recent_intent(&self, intent: &str) -> Result<Vec<String>> {
        let _gate = self.write_gate().await;
        self.record_intents(&[intent.to_string()]).await
    }

    /// Applies each intent in order, so the last one ends up first. Callers
    /// hold the write gate.
    pub(crate) async fn record_intents(&self, intents: &[String]) -> Result<Vec<String>> {
        let mut recent = self.get_recent_intents().await?;
        let before = recent.clone();

        for intent in intents {
            let intent = intent.trim();
            if intent.is_empty() {
                continue;
            }
            let lowered = intent.to_lowercase();
            recent.retain(|existing| existing.to_lowercase() != lowered);
            recent.insert(0, intent.to_string());
        }
        recent.truncate(self.config().recent_intent_limit);

        if recent != before {
            self.save(keys::RECENT_INTENTS, &recent).await?;
        }
        Ok(recent)
    }

    /// Free-form settings object; absent reads as `{}`.
    pub async fn get_settings(&self) -> Result<Value> {
        Ok(self
            .load::<Value>(keys::USER_SETTINGS)
            .await?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Replaces the settings object.
    pub async fn save_settings(&self, settings: Value) -> Result<()> {
        if !settings.is_object() {
            return Err(TabulaError::invalid_state("settings must be a JSON object"));
        }
        let _gate = self.write_gate().await;
        self.save(keys::USER_SETTINGS, &settings).await
    }
}
