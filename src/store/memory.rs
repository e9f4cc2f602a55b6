//! # In-Memory Stores
//!
//! Process-local record and blob stores. Used by the test-suite and by the
//! `memory` backend for running the server without a remote project. Both
//! keep enough call history to assert on ordering and batching.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::blob::BlobStore;
use super::errors::{StoreError, StoreResult};
use super::record::{PostStore, SettingsStore};
use crate::posts::model::{NewPost, Post, PostPatch};
use crate::settings::model::Settings;

fn poisoned() -> StoreError {
    StoreError::Internal("Lock poisoned".into())
}

// ==================
// Record store
// ==================

/// Post and settings tables held in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    /// Rows in insertion order
    posts: RwLock<Vec<Post>>,
    settings: RwLock<HashMap<String, Settings>>,
    fail_post_deletes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `delete_post` fail
    pub fn set_fail_post_deletes(&self, fail: bool) {
        self.fail_post_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored posts
    pub fn post_count(&self) -> usize {
        self.posts.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Number of stored settings rows
    pub fn settings_count(&self) -> usize {
        self.settings.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PostStore for MemoryRecordStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        // newest insert first; the stable sort keeps that order for equal timestamps
        let mut rows: Vec<Post> = posts.iter().rev().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_post(&self, id: &str) -> StoreResult<Option<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let now = Utc::now();
        let row = Post {
            id: Uuid::new_v4().to_string(),
            fields: post.fields,
            media_type: post.media_type,
            media_urls: post.media_urls,
            media_paths: post.media_paths,
            created_at: now,
            updated_at: now,
        };

        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        posts.push(row.clone());
        Ok(row)
    }

    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Post> {
        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        let row = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::RowNotFound(id.to_string()))?;

        patch.apply_to(row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_post(&self, id: &str) -> StoreResult<()> {
        if self.fail_post_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("could not delete post {}", id)));
        }

        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        posts.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryRecordStore {
    async fn find_settings(&self, id: &str) -> StoreResult<Option<Settings>> {
        let settings = self.settings.read().map_err(|_| poisoned())?;
        Ok(settings.get(id).cloned())
    }

    async fn upsert_settings(&self, id: &str, fields: Map<String, Value>) -> StoreResult<Settings> {
        let now = Utc::now();
        let mut settings = self.settings.write().map_err(|_| poisoned())?;

        let created_at = settings
            .get(id)
            .and_then(|existing| existing.created_at)
            .unwrap_or(now);

        let row = Settings {
            id: id.to_string(),
            fields,
            created_at: Some(created_at),
            updated_at: Some(now),
        };
        settings.insert(id.to_string(), row.clone());
        Ok(row)
    }
}

// ==================
// Blob store
// ==================

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object storage held in memory
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    /// Every `remove` call, in order
    removals: RwLock<Vec<Vec<String>>>,
    upload_attempts: AtomicUsize,
    /// Uploads fail once this many attempts have been made
    fail_uploads_after: AtomicUsize,
    fail_removes: AtomicBool,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("http://localhost/storage/v1/object/public/cms-files")
    }
}

impl MemoryBlobStore {
    /// Create a store whose public URLs live under `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            removals: RwLock::new(Vec::new()),
            upload_attempts: AtomicUsize::new(0),
            fail_uploads_after: AtomicUsize::new(usize::MAX),
            fail_removes: AtomicBool::new(false),
        }
    }

    /// Let `n` more uploads succeed, then fail the rest
    pub fn fail_uploads_after(&self, n: usize) {
        let made = self.upload_attempts.load(Ordering::SeqCst);
        self.fail_uploads_after.store(made + n, Ordering::SeqCst);
    }

    /// Make every subsequent `remove` fail
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Whether an object is stored at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .read()
            .map(|o| o.contains_key(path))
            .unwrap_or(false)
    }

    /// Content type recorded for `path`
    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .ok()
            .and_then(|o| o.get(path).map(|obj| obj.content_type.clone()))
    }

    /// Size in bytes of the object at `path`
    pub fn object_len(&self, path: &str) -> Option<usize> {
        self.objects
            .read()
            .ok()
            .and_then(|o| o.get(path).map(|obj| obj.data.len()))
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    /// Number of upload calls made, successful or not
    pub fn upload_attempts(&self) -> usize {
        self.upload_attempts.load(Ordering::SeqCst)
    }

    /// Path batches passed to `remove`, one entry per call
    pub fn removal_calls(&self) -> Vec<Vec<String>> {
        self.removals.read().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> StoreResult<()> {
        let attempt = self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_uploads_after.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("upload rejected: {}", path)));
        }

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        if objects.contains_key(path) {
            return Err(StoreError::ObjectAlreadyExists(path.to_string()));
        }

        objects.insert(
            path.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> StoreResult<()> {
        self.removals
            .write()
            .map_err(|_| poisoned())?
            .push(paths.to_vec());

        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("object removal failed".into()));
        }

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
