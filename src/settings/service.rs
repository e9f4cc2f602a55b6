//! # Settings Manager
//!
//! Singleton documents merged key by key. Reads never create rows; the first
//! upsert does.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use super::model::Settings;
use crate::errors::CmsResult;
use crate::realtime::ChangeNotifier;
use crate::store::SettingsStore;

/// Settings manager
pub struct SettingsService {
    records: Arc<dyn SettingsStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SettingsService {
    pub fn new(records: Arc<dyn SettingsStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { records, notifier }
    }

    /// Stored document, or an unsaved empty default
    pub async fn get(&self, id: &str) -> CmsResult<Settings> {
        Ok(self
            .records
            .find_settings(id)
            .await?
            .unwrap_or_else(|| Settings::empty(id)))
    }

    /// Shallow-merge `partial` over the stored fields and save
    pub async fn upsert(&self, id: &str, partial: Map<String, Value>) -> CmsResult<Settings> {
        let current = self.get(id).await?;
        let merged = merge_fields(current.fields, partial);

        let saved = self.records.upsert_settings(id, merged).await?;

        info!(settings_id = %saved.id, keys = saved.fields.len(), "settings saved");
        self.notifier.settings_updated(&saved);
        Ok(saved)
    }
}

/// New keys are added, existing keys overwritten, others kept
fn merge_fields(mut base: Map<String, Value>, partial: Map<String, Value>) -> Map<String, Value> {
    base.extend(partial);
    base
}
