//! # Settings Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CmsError;
use crate::store::record::null_as_default;

/// Id used when the caller does not name a settings document
pub const DEFAULT_SETTINGS_ID: &str = "app";

/// Singleton settings document keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Settings {
    /// Unsaved default returned for ids that have never been written
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// `?id=` query for the settings endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    pub id: Option<String>,
}

impl SettingsQuery {
    /// Requested id; missing or empty falls back to `"app"`
    pub fn id(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_SETTINGS_ID,
        }
    }
}

/// Extract the partial fields from a `PUT /settings` body.
///
/// Accepts `{"fields": {...}}` or the bare object itself.
pub fn partial_fields(body: Value) -> Result<Map<String, Value>, CmsError> {
    match body {
        Value::Object(mut map) => match map.remove("fields") {
            Some(Value::Object(fields)) => Ok(fields),
            Some(other) => {
                map.insert("fields".to_string(), other);
                Ok(map)
            }
            None => Ok(map),
        },
        _ => Err(CmsError::validation("fields is required")),
    }
}
