//! # Blob Store Trait

use async_trait::async_trait;
use bytes::Bytes;

use super::errors::StoreResult;

/// Object storage keyed by path
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write an object. Never overwrites: an existing path fails with
    /// `StoreError::ObjectAlreadyExists`.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> StoreResult<()>;

    /// Delete a batch of objects in one call
    async fn remove(&self, paths: &[String]) -> StoreResult<()>;

    /// Public URL serving the object at `path`
    fn public_url(&self, path: &str) -> String;
}
