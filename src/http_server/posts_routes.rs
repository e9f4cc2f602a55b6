//! Post HTTP Routes
//!
//! Listing and lifecycle endpoints for posts.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};

use super::errors::ApiResult;
use crate::posts::model::{CreatePostRequest, UpdatePostRequest};
use crate::posts::{CreatePost, DeletedPost, Post, PostService, UpdatePost};

/// Create post routes
pub fn posts_routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route("/posts/:id", put(update_post_handler).delete(delete_post_handler))
        .with_state(service)
}

async fn list_posts_handler(State(service): State<Arc<PostService>>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(service.list().await?))
}

async fn create_post_handler(
    State(service): State<Arc<PostService>>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let Json(request) = body?;
    let cmd = CreatePost::try_from(request)?;
    Ok(Json(service.create(cmd).await?))
}

async fn update_post_handler(
    State(service): State<Arc<PostService>>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let Json(request) = body?;
    let cmd = UpdatePost::try_from(request)?;
    Ok(Json(service.update(&id, cmd).await?))
}

async fn delete_post_handler(
    State(service): State<Arc<PostService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedPost>> {
    Ok(Json(service.delete(&id).await?))
}
