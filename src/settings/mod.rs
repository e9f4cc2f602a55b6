//! # Settings
//!
//! Key-value settings documents shared by every client, `"app"` by default.

pub mod model;
pub mod service;

pub use model::{Settings, SettingsQuery, DEFAULT_SETTINGS_ID};
pub use service::SettingsService;
