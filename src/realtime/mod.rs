//! # Real-Time Module
//!
//! Change notifications for connected clients.
//!
//! - **Events**: `post:upsert`, `post:delete`, `settings:update`
//! - **Notifier**: non-blocking fan-out injected into the lifecycle managers
//!
//! The WebSocket transport lives in `http_server::realtime_routes`.

pub mod event;
pub mod notifier;

pub use event::ChangeEvent;
pub use notifier::{BroadcastNotifier, ChangeNotifier};
