//! postboard - content backend for media-attached posts and app settings
//!
//! Posts carry free-form `fields` plus an optional set of uploaded media;
//! settings are keyed JSON documents merged shallowly on write. Every
//! committed change is pushed to WebSocket clients.

pub mod cli;
pub mod errors;
pub mod http_server;
pub mod media;
pub mod observability;
pub mod posts;
pub mod realtime;
pub mod settings;
pub mod store;

pub use errors::{CmsError, CmsResult};
