//! # Post Lifecycle
//!
//! Create, update, and delete posts while keeping each row's media metadata
//! consistent with the blobs it references:
//!
//! - a post has a media kind exactly when it has media URLs
//! - replacing a post's paths deletes the previously referenced objects
//! - deleting a post deletes its objects
//!
//! Blob cleanup runs before the row write and its failure aborts the
//! operation. On delete this leaves a window where objects are gone but the
//! row survives if the row delete then fails.
//!
//! Updates are stricter than "write whatever `mediaType` says": a kind sent
//! without `mediaUrls` is rejected when the post has no stored URLs, and an
//! explicit `mediaType: null` is rejected while URLs remain. A client that
//! always echoes `mediaType` on text-only edits of a media-less post gets a
//! validation error and must omit the key instead.
//!
//! Paths outside the upload folder of the kind's family (`images/` for image
//! kinds, `videos/` for video kinds) are accepted but logged.
//!
//! Every committed write is published to the notifier before returning.
//! Requests are not serialised per id: concurrent updates of one post race,
//! and the last row write wins.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::model::{CreatePost, DeletedPost, NewPost, Post, PostPatch, UpdatePost};
use crate::errors::{CmsError, CmsResult};
use crate::media::kind::INVALID_MEDIA_TYPE;
use crate::media::MediaType;
use crate::realtime::ChangeNotifier;
use crate::store::{BlobStore, PostStore};

const MEDIA_TYPE_REQUIRED: &str = "mediaType is required when mediaUrls is provided";
const UNKNOWN_MEDIA_TYPE: &str = "mediaType must be images/video/popup_images/popup_video";
const MEDIA_TYPE_WITHOUT_URLS: &str = "mediaType requires mediaUrls";

/// Post lifecycle manager
pub struct PostService {
    records: Arc<dyn PostStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl PostService {
    pub fn new(
        records: Arc<dyn PostStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            records,
            blobs,
            notifier,
        }
    }

    /// All posts, newest first
    pub async fn list(&self) -> CmsResult<Vec<Post>> {
        Ok(self.records.list_posts().await?)
    }

    /// Insert a new post
    pub async fn create(&self, cmd: CreatePost) -> CmsResult<Post> {
        let media_type = if cmd.media_urls.is_empty() {
            None
        } else {
            Some(resolve_media_type(cmd.media_type.as_deref(), None)?)
        };

        let row = self
            .records
            .insert_post(NewPost {
                fields: cmd.fields,
                media_type,
                media_urls: cmd.media_urls,
                media_paths: cmd.media_paths,
            })
            .await?;

        warn_on_foreign_paths(&row.id, row.media_type, &row.media_paths);
        info!(post_id = %row.id, media_type = ?row.media_type, "post created");
        self.notifier.post_upserted(&row);
        Ok(row)
    }

    /// Apply a partial update, deleting replaced media objects first
    #[instrument(skip(self, cmd))]
    pub async fn update(&self, id: &str, cmd: UpdatePost) -> CmsResult<Post> {
        let existing = self.find(id).await?;
        let patch = plan_update(&existing, cmd)?;

        if let Some(stale) = replaced_paths(&existing, &patch) {
            self.blobs.remove(stale).await?;
            info!(post_id = %id, removed = stale.len(), "replaced media removed");
        }

        let row = self.records.update_post(id, patch).await?;

        warn_on_foreign_paths(&row.id, row.media_type, &row.media_paths);
        info!(post_id = %row.id, "post updated");
        self.notifier.post_upserted(&row);
        Ok(row)
    }

    /// Delete a post and its media objects
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> CmsResult<DeletedPost> {
        let existing = self.find(id).await?;

        if !existing.media_paths.is_empty() {
            self.blobs.remove(&existing.media_paths).await?;
            info!(post_id = %id, removed = existing.media_paths.len(), "post media removed");
        }

        self.records.delete_post(id).await?;

        info!(post_id = %id, "post deleted");
        self.notifier.post_deleted(id);
        Ok(DeletedPost { id: id.to_string() })
    }

    async fn find(&self, id: &str) -> CmsResult<Post> {
        self.records
            .find_post(id)
            .await?
            .ok_or_else(|| CmsError::not_found(format!("Post not found: {}", id)))
    }
}

/// Resolve the kind for a non-empty URL list: the supplied value if any,
/// otherwise `fallback`.
fn resolve_media_type(supplied: Option<&str>, fallback: Option<MediaType>) -> CmsResult<MediaType> {
    match supplied {
        Some(raw) => raw
            .parse::<MediaType>()
            .map_err(|_| CmsError::validation(INVALID_MEDIA_TYPE)),
        None => fallback.ok_or_else(|| CmsError::validation(MEDIA_TYPE_REQUIRED)),
    }
}

/// Compute the columns an update writes.
///
/// Media kind, in order of precedence:
/// 1. `mediaUrls: []` clears it, whatever `mediaType` says
/// 2. an explicit `mediaType` (including `null`) is written
/// 3. otherwise the column is left alone
///
/// A non-empty `mediaUrls` must end up with a kind: the supplied one, else
/// the stored one.
pub fn plan_update(existing: &Post, cmd: UpdatePost) -> CmsResult<PostPatch> {
    let media_type = match cmd.media_urls.as_deref() {
        Some([]) => Some(None),
        Some(_) => {
            let supplied = cmd.media_type.as_ref().and_then(|raw| raw.as_deref());
            Some(Some(resolve_media_type(supplied, existing.media_type)?))
        }
        None => match &cmd.media_type {
            None => None,
            Some(raw) => {
                let next = raw
                    .as_deref()
                    .map(|s| {
                        s.parse::<MediaType>()
                            .map_err(|_| CmsError::validation(UNKNOWN_MEDIA_TYPE))
                    })
                    .transpose()?;
                check_kind_matches_urls(next, &existing.media_urls)?;
                Some(next)
            }
        },
    };

    Ok(PostPatch {
        fields: cmd.fields,
        media_type,
        media_urls: cmd.media_urls,
        media_paths: cmd.media_paths,
    })
}

/// A kind written without new URLs must agree with the stored URLs
fn check_kind_matches_urls(kind: Option<MediaType>, urls: &[String]) -> CmsResult<()> {
    match (kind, urls.is_empty()) {
        (None, false) => Err(CmsError::validation(
            "mediaType cannot be cleared while the post has mediaUrls",
        )),
        (Some(_), true) => Err(CmsError::validation(MEDIA_TYPE_WITHOUT_URLS)),
        _ => Ok(()),
    }
}

/// Stored paths that an update replaces, if they must be deleted.
///
/// Paths are compared in order; identical lists and empty old lists need no
/// cleanup.
pub fn replaced_paths<'a>(existing: &'a Post, patch: &PostPatch) -> Option<&'a [String]> {
    match &patch.media_paths {
        Some(next) if *next != existing.media_paths && !existing.media_paths.is_empty() => {
            Some(&existing.media_paths)
        }
        _ => None,
    }
}

/// Paths not stored under the upload folder of `kind`'s family
pub fn foreign_paths(kind: MediaType, paths: &[String]) -> Vec<&str> {
    let folder = kind.family().folder();
    paths
        .iter()
        .map(String::as_str)
        .filter(|path| path.split('/').next() != Some(folder))
        .collect()
}

fn warn_on_foreign_paths(post_id: &str, kind: Option<MediaType>, paths: &[String]) {
    let Some(kind) = kind else {
        return;
    };
    let foreign = foreign_paths(kind, paths);
    if !foreign.is_empty() {
        warn!(post_id = %post_id, media_type = %kind, paths = ?foreign, "media paths outside the kind's upload folder");
    }
}
