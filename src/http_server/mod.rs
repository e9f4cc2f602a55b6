//! # HTTP Server Module
//!
//! REST surface for posts, uploads, and settings, plus the WebSocket push
//! channel, combined into one Axum router.
//!
//! # Endpoints
//!
//! - `GET /posts`, `POST /posts`, `PUT /posts/:id`, `DELETE /posts/:id`
//! - `POST /upload/images`, `POST /upload/video` (multipart)
//! - `GET /settings?id=`, `PUT /settings?id=`
//! - `GET /ws` - change events
//! - `GET /health`

pub mod config;
pub mod cors;
pub mod errors;
pub mod posts_routes;
pub mod realtime_routes;
pub mod server;
pub mod settings_routes;
pub mod upload_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::{Backends, HttpServer};
