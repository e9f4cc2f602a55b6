//! # Change Events
//!
//! Events pushed to connected clients after a successful write.

use serde::{Deserialize, Serialize};

use crate::posts::model::{DeletedPost, Post};
use crate::settings::model::Settings;

/// A state change broadcast to every subscriber.
///
/// Serialised as `{"event": "<name>", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ChangeEvent {
    /// Post created or updated; payload is the full row
    #[serde(rename = "post:upsert")]
    PostUpsert(Post),

    /// Post deleted; payload is `{id}`
    #[serde(rename = "post:delete")]
    PostDelete(DeletedPost),

    /// Settings document saved; payload is the full row
    #[serde(rename = "settings:update")]
    SettingsUpdate(Settings),
}

impl ChangeEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::PostUpsert(_) => "post:upsert",
            ChangeEvent::PostDelete(_) => "post:delete",
            ChangeEvent::SettingsUpdate(_) => "settings:update",
        }
    }
}

impl std::fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
