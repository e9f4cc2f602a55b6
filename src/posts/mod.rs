//! # Posts
//!
//! Post rows with attached media and the lifecycle manager that keeps media
//! metadata and stored objects consistent.

pub mod model;
pub mod service;

pub use model::{CreatePost, DeletedPost, Post, UpdatePost};
pub use service::PostService;
