//! # Media Upload
//!
//! Validates uploaded payloads against the allow-list for their kind, writes
//! them to the blob store under collision-free paths, and returns the
//! path/URL pairs a post can reference.
//!
//! Every payload in a batch is checked before the first write. A write
//! failure part-way through a batch aborts it, but objects already written by
//! that batch stay in the store: there is no rollback.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::kind::{MediaFamily, MediaType};
use crate::errors::{CmsError, CmsResult};
use crate::store::BlobStore;

/// Maximum number of images accepted in one upload
pub const MAX_IMAGE_FILES: usize = 10;

const IMAGE_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];
const VIDEO_MIME_TYPES: &[&str] = &["video/mp4"];

const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
const VIDEO_EXTENSION: &str = "mp4";

/// A single uploaded payload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original client-side file name
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: Option<&str>, content_type: &str, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.map(str::to_string),
            content_type: content_type.to_string(),
            data: data.into(),
        }
    }
}

/// Where a payload landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub path: String,
    pub url: String,
}

/// Upload response body; paths and URLs are positionally aligned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub media_type: MediaType,
    pub media_paths: Vec<String>,
    pub media_urls: Vec<String>,
}

impl UploadedMedia {
    fn from_stored(media_type: MediaType, stored: Vec<StoredMedia>) -> Self {
        let (media_paths, media_urls) = stored.into_iter().map(|s| (s.path, s.url)).unzip();
        Self {
            media_type,
            media_paths,
            media_urls,
        }
    }
}

/// Writes validated uploads to the blob store
pub struct MediaUploader {
    blobs: Arc<dyn BlobStore>,
}

impl MediaUploader {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Validate and store a batch of PNG/JPEG images, in input order
    pub async fn upload_images(&self, files: Vec<UploadedFile>) -> CmsResult<UploadedMedia> {
        if files.is_empty() {
            return Err(CmsError::validation("files required"));
        }
        if files.len() > MAX_IMAGE_FILES {
            return Err(CmsError::validation(format!(
                "Too many files (max: {})",
                MAX_IMAGE_FILES
            )));
        }
        if files.iter().any(|f| !IMAGE_MIME_TYPES.contains(&f.content_type.as_str())) {
            return Err(CmsError::validation("Images must be PNG/JPG"));
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let ext = image_extension(file.file_name.as_deref());
            let done = stored.len();
            stored.push(self.store(MediaFamily::Image, &ext, file, done).await?);
        }

        info!(count = stored.len(), "images uploaded");
        Ok(UploadedMedia::from_stored(MediaType::Images, stored))
    }

    /// Validate and store a single MP4 video
    pub async fn upload_video(&self, file: Option<UploadedFile>) -> CmsResult<UploadedMedia> {
        let file = file.ok_or_else(|| CmsError::validation("file required"))?;
        if !VIDEO_MIME_TYPES.contains(&file.content_type.as_str()) {
            return Err(CmsError::validation("Video must be MP4"));
        }

        let stored = self.store(MediaFamily::Video, VIDEO_EXTENSION, file, 0).await?;

        info!(path = %stored.path, "video uploaded");
        Ok(UploadedMedia::from_stored(MediaType::Video, vec![stored]))
    }

    async fn store(
        &self,
        family: MediaFamily,
        ext: &str,
        file: UploadedFile,
        already_stored: usize,
    ) -> CmsResult<StoredMedia> {
        let path = storage_path(family, ext);

        if let Err(e) = self.blobs.upload(&path, file.data, &file.content_type).await {
            if already_stored > 0 {
                warn!(
                    path = %path,
                    orphaned = already_stored,
                    "upload failed after earlier files of the batch were stored"
                );
            }
            return Err(e.into());
        }

        let url = self.blobs.public_url(&path);
        Ok(StoredMedia { path, url })
    }
}

/// Fresh storage path `<folder>/<micros>-<random>.<ext>`
pub fn storage_path(family: MediaFamily, ext: &str) -> String {
    format!("{}/{}.{}", family.folder(), unique_token(), ext)
}

/// Microsecond timestamp plus 64 random bits
fn unique_token() -> String {
    format!("{}-{:016x}", Utc::now().timestamp_micros(), rand::random::<u64>())
}

/// Extension from the original file name, `jpg` when there is none usable
fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}
