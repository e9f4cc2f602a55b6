//! # Media
//!
//! Media kinds and the upload validator that turns raw payloads into stored
//! path/URL pairs.

pub mod kind;
pub mod upload;

pub use kind::{MediaFamily, MediaType};
pub use upload::{MediaUploader, UploadedFile, UploadedMedia, MAX_IMAGE_FILES};
