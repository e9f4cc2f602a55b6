//! # Supabase Adapter
//!
//! Record store over the PostgREST surface and blob store over the Storage
//! object API of a Supabase project, authenticated with the service-role key.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::blob::BlobStore;
use super::errors::{StoreError, StoreResult};
use super::record::{PostStore, SettingsStore};
use crate::posts::model::{NewPost, Post, PostPatch};
use crate::settings::model::Settings;

const POSTS_TABLE: &str = "posts";
const SETTINGS_TABLE: &str = "settings";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service-role key
    pub service_key: String,
    /// Storage bucket holding uploaded media
    pub bucket: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// HTTP client for one Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: Client,
}

/// Error body shapes returned by PostgREST and Storage
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl SupabaseClient {
    /// Create a client
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.bucket, path
        )
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/object/{}", self.config.url, self.config.bucket)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    /// Turn a non-2xx response into `StoreError::Backend` carrying the remote message
    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend(error_message(status, &body)))
    }

    async fn rows<T: DeserializeOwned>(response: Response) -> StoreResult<Vec<T>> {
        let response = Self::check(response).await?;
        response.json::<Vec<T>>().await.map_err(StoreError::from)
    }

    async fn select_by_id<T: DeserializeOwned>(&self, table: &str, id: &str) -> StoreResult<Option<T>> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);

        let rows: Vec<T> = Self::rows(self.authed(request).send().await?).await?;
        Ok(rows.into_iter().next())
    }
}

/// Best available human-readable message from an error body
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .or(parsed.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        })
}

fn is_duplicate(status: StatusCode, message: &str) -> bool {
    status == StatusCode::CONFLICT
        || message.eq_ignore_ascii_case("duplicate")
        || message.contains("already exists")
}

#[async_trait]
impl PostStore for SupabaseClient {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let request = self
            .http
            .get(self.table_url(POSTS_TABLE))
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        Self::rows(self.authed(request).send().await?).await
    }

    async fn find_post(&self, id: &str) -> StoreResult<Option<Post>> {
        self.select_by_id(POSTS_TABLE, id).await
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let request = self
            .http
            .post(self.table_url(POSTS_TABLE))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&post);

        let rows: Vec<Post> = Self::rows(self.authed(request).send().await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Post> {
        let request = self
            .http
            .patch(self.table_url(POSTS_TABLE))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);

        let rows: Vec<Post> = Self::rows(self.authed(request).send().await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::RowNotFound(id.to_string()))
    }

    async fn delete_post(&self, id: &str) -> StoreResult<()> {
        let request = self
            .http
            .delete(self.table_url(POSTS_TABLE))
            .query(&[("id", format!("eq.{}", id))]);

        Self::check(self.authed(request).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SupabaseClient {
    async fn find_settings(&self, id: &str) -> StoreResult<Option<Settings>> {
        self.select_by_id(SETTINGS_TABLE, id).await
    }

    async fn upsert_settings(&self, id: &str, fields: Map<String, Value>) -> StoreResult<Settings> {
        let request = self
            .http
            .post(self.table_url(SETTINGS_TABLE))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&json!({ "id": id, "fields": fields }));

        let rows: Vec<Settings> = Self::rows(self.authed(request).send().await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("upsert returned no row".into()))
    }
}

#[async_trait]
impl BlobStore for SupabaseClient {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> StoreResult<()> {
        let request = self
            .http
            .post(self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data);

        let response = self.authed(request).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(path = %path, bucket = %self.config.bucket, "object uploaded");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        if is_duplicate(status, &message) {
            Err(StoreError::ObjectAlreadyExists(path.to_string()))
        } else {
            Err(StoreError::Backend(message))
        }
    }

    async fn remove(&self, paths: &[String]) -> StoreResult<()> {
        let request = self
            .http
            .delete(self.bucket_url())
            .json(&json!({ "prefixes": paths }));

        Self::check(self.authed(request).send().await?).await?;
        debug!(count = paths.len(), bucket = %self.config.bucket, "objects removed");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.bucket, path
        )
    }
}
