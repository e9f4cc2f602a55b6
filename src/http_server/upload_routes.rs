//! Upload HTTP Routes
//!
//! Multipart endpoints that store media and return the paths and URLs to
//! attach to a post.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    routing::post,
    Json, Router,
};

use super::errors::ApiResult;
use crate::media::{MediaUploader, UploadedFile, UploadedMedia, MAX_IMAGE_FILES};

const IMAGES_FIELD: &str = "files";
const VIDEO_FIELD: &str = "file";

/// Create upload routes
pub fn upload_routes(uploader: Arc<MediaUploader>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/upload/images", post(upload_images_handler))
        .route("/upload/video", post(upload_video_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(uploader)
}

async fn read_file(field: Field<'_>) -> ApiResult<UploadedFile> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await?;

    Ok(UploadedFile {
        file_name,
        content_type,
        data,
    })
}

async fn upload_images_handler(
    State(uploader): State<Arc<MediaUploader>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedMedia>> {
    let mut multipart = multipart?;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        files.push(read_file(field).await?);
        // one past the limit is enough for the uploader to reject the batch
        if files.len() > MAX_IMAGE_FILES {
            break;
        }
    }

    Ok(Json(uploader.upload_images(files).await?))
}

async fn upload_video_handler(
    State(uploader): State<Arc<MediaUploader>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedMedia>> {
    let mut multipart = multipart?;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(VIDEO_FIELD) {
            file = Some(read_file(field).await?);
            break;
        }
    }

    Ok(Json(uploader.upload_video(file).await?))
}
