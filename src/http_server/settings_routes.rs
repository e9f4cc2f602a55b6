//! Settings HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use super::errors::ApiResult;
use crate::settings::model::partial_fields;
use crate::settings::{Settings, SettingsQuery, SettingsService};

/// Create settings routes
pub fn settings_routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .with_state(service)
}

async fn get_settings_handler(
    State(service): State<Arc<SettingsService>>,
    Query(query): Query<SettingsQuery>,
) -> ApiResult<Json<Settings>> {
    Ok(Json(service.get(query.id()).await?))
}

async fn put_settings_handler(
    State(service): State<Arc<SettingsService>>,
    Query(query): Query<SettingsQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Settings>> {
    let Json(body) = body?;
    let fields = partial_fields(body)?;
    Ok(Json(service.upsert(query.id(), fields).await?))
}
