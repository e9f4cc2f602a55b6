//! # Record Store
//!
//! Document tables holding post and settings rows. Implementations provide
//! atomic single-row reads and writes; nothing here spans rows.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::errors::StoreResult;
use crate::posts::model::{NewPost, Post, PostPatch};
use crate::settings::model::Settings;

/// Table of posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest `created_at` first
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    /// Read a single post
    async fn find_post(&self, id: &str) -> StoreResult<Option<Post>>;

    /// Insert a row and return it with id and timestamps assigned
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;

    /// Write the present columns of `patch` and return the updated row
    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Post>;

    /// Delete a row by id
    async fn delete_post(&self, id: &str) -> StoreResult<()>;
}

/// Table of settings documents
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a settings row
    async fn find_settings(&self, id: &str) -> StoreResult<Option<Settings>>;

    /// Insert or replace the row keyed by `id`
    async fn upsert_settings(&self, id: &str, fields: Map<String, Value>) -> StoreResult<Settings>;
}

/// Decode a nullable column, reading `null` as the empty value.
///
/// PostgREST returns `null` rather than omitting the key, which
/// `#[serde(default)]` alone does not cover.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
