//! Post Lifecycle Tests
//!
//! Media kind derivation, blob cleanup ordering, and change notification for
//! the post manager running over in-memory stores.

mod common;

use bytes::Bytes;
use postboard::media::MediaType;
use postboard::posts::{CreatePost, PostService, UpdatePost};
use postboard::realtime::ChangeEvent;
use postboard::settings::SettingsService;
use postboard::store::BlobStore;
use postboard::CmsError;
use serde_json::{json, Map, Value};

use common::{strings, Fixture};

// =============================================================================
// Helper Functions
// =============================================================================

fn service(fx: &Fixture) -> PostService {
    PostService::new(fx.records.clone(), fx.blobs.clone(), fx.notifier.clone())
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("fields must be an object"),
    }
}

fn create_cmd(media_type: Option<&str>, urls: &[&str], paths: &[&str]) -> CreatePost {
    CreatePost {
        fields: fields(json!({"title": "hello"})),
        media_type: media_type.map(str::to_string),
        media_urls: strings(urls),
        media_paths: strings(paths),
    }
}

async fn seed_blobs(fx: &Fixture, paths: &[&str]) {
    for path in paths {
        fx.blobs
            .upload(path, Bytes::from_static(b"data"), "video/mp4")
            .await
            .unwrap();
    }
}

fn assert_validation(result: Result<impl std::fmt::Debug, CmsError>) {
    match result {
        Err(CmsError::Validation(_)) => {}
        other => panic!("expected validation error, got {:?}", other),
    }
}

// =============================================================================
// Create
// =============================================================================

/// Without URLs the stored kind is null whatever the caller sent.
#[tokio::test]
async fn test_create_without_urls_has_no_media_type() {
    let fx = Fixture::new();
    let posts = service(&fx);

    for kind in [None, Some("images"), Some("video"), Some("popup_video")] {
        let post = posts.create(create_cmd(kind, &[], &[])).await.unwrap();
        assert_eq!(post.media_type, None);
        assert!(post.media_urls.is_empty());
    }
}

#[tokio::test]
async fn test_create_with_urls_requires_valid_kind() {
    let fx = Fixture::new();
    let posts = service(&fx);

    assert_validation(posts.create(create_cmd(None, &["https://x/a.png"], &["images/a.png"])).await);
    assert_validation(posts.create(create_cmd(Some("gallery"), &["https://x/a.png"], &["images/a.png"])).await);
    assert_eq!(fx.records.post_count(), 0);
    assert!(fx.notifier.events().is_empty());
}

#[tokio::test]
async fn test_create_stores_row_and_notifies() {
    let fx = Fixture::new();
    let posts = service(&fx);

    let post = posts
        .create(create_cmd(Some("popup_images"), &["https://x/a.png"], &["images/a.png"]))
        .await
        .unwrap();

    assert_eq!(post.media_type, Some(MediaType::PopupImages));
    assert_eq!(post.fields["title"], json!("hello"));
    assert_eq!(fx.notifier.events(), vec![ChangeEvent::PostUpsert(post.clone())]);
    assert_eq!(posts.list().await.unwrap(), vec![post]);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let fx = Fixture::new();
    let posts = service(&fx);

    let first = posts.create(create_cmd(None, &[], &[])).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = posts.create(create_cmd(None, &[], &[])).await.unwrap();

    let ids: Vec<String> = posts.list().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let fx = Fixture::new();
    let posts = service(&fx);

    let result = posts.update("nope", UpdatePost::default()).await;
    assert!(matches!(result, Err(CmsError::NotFound(_))));
}

/// An empty URL list clears the kind even when one is supplied.
#[tokio::test]
async fn test_update_empty_urls_clears_media_type() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();

    let updated = posts
        .update(
            &post.id,
            UpdatePost {
                media_type: Some(Some("images".into())),
                media_urls: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.media_type, None);
    assert!(updated.media_urls.is_empty());
}

#[tokio::test]
async fn test_update_urls_without_resolvable_kind_fails() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts.create(create_cmd(None, &[], &[])).await.unwrap();

    assert_validation(
        posts
            .update(
                &post.id,
                UpdatePost {
                    media_urls: Some(strings(&["https://x/a.png"])),
                    ..Default::default()
                },
            )
            .await,
    );
    assert_validation(
        posts
            .update(
                &post.id,
                UpdatePost {
                    media_type: Some(Some("banner".into())),
                    media_urls: Some(strings(&["https://x/a.png"])),
                    ..Default::default()
                },
            )
            .await,
    );
    // only the create was published
    assert_eq!(fx.notifier.names(), vec!["post:upsert"]);
}

#[tokio::test]
async fn test_update_urls_fall_back_to_stored_kind() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(Some("images"), &["https://x/a.png"], &["images/a.png"]))
        .await
        .unwrap();

    let updated = posts
        .update(
            &post.id,
            UpdatePost {
                media_urls: Some(strings(&["https://x/b.png", "https://x/c.png"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.media_type, Some(MediaType::Images));
    assert_eq!(updated.media_urls.len(), 2);
}

/// Replacing paths removes the old objects in one call, before the row write.
#[tokio::test]
async fn test_update_replaced_paths_removed_once() {
    let fx = Fixture::new();
    let posts = service(&fx);
    seed_blobs(&fx, &["videos/a.mp4"]).await;
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();

    let updated = posts
        .update(
            &post.id,
            UpdatePost {
                media_paths: Some(strings(&["videos/b.mp4"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(fx.blobs.removal_calls(), vec![strings(&["videos/a.mp4"])]);
    assert!(!fx.blobs.contains("videos/a.mp4"));
    assert_eq!(updated.media_paths, strings(&["videos/b.mp4"]));
    assert_eq!(updated.media_type, Some(MediaType::Video));
    assert_eq!(updated.media_urls, strings(&["https://x/a.mp4"]));
}

#[tokio::test]
async fn test_update_same_paths_removes_nothing() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();

    posts
        .update(
            &post.id,
            UpdatePost {
                fields: Some(fields(json!({"title": "renamed"}))),
                media_paths: Some(strings(&["videos/a.mp4"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(fx.blobs.removal_calls().is_empty());
}

#[tokio::test]
async fn test_update_reordered_paths_counts_as_change() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(
            Some("images"),
            &["https://x/a.png", "https://x/b.png"],
            &["images/a.png", "images/b.png"],
        ))
        .await
        .unwrap();

    posts
        .update(
            &post.id,
            UpdatePost {
                media_paths: Some(strings(&["images/b.png", "images/a.png"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(fx.blobs.removal_calls().len(), 1);
}

/// A failed cleanup aborts the update before the row changes.
#[tokio::test]
async fn test_update_remove_failure_leaves_row_untouched() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();
    fx.blobs.set_fail_removes(true);

    let result = posts
        .update(
            &post.id,
            UpdatePost {
                media_paths: Some(strings(&["videos/b.mp4"])),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(CmsError::Store(_))));
    assert_eq!(posts.list().await.unwrap(), vec![post]);
    assert_eq!(fx.notifier.names(), vec!["post:upsert"]);
}

#[tokio::test]
async fn test_update_keeps_unmentioned_columns() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();

    let updated = posts
        .update(
            &post.id,
            UpdatePost {
                fields: Some(fields(json!({"title": "renamed"}))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.fields["title"], json!("renamed"));
    assert_eq!(updated.media_type, post.media_type);
    assert_eq!(updated.media_urls, post.media_urls);
    assert_eq!(updated.media_paths, post.media_paths);
    assert_eq!(
        fx.notifier.events().last(),
        Some(&ChangeEvent::PostUpsert(updated))
    );
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_blobs_then_row() {
    let fx = Fixture::new();
    let posts = service(&fx);
    seed_blobs(&fx, &["videos/a.mp4"]).await;
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();

    let deleted = posts.delete(&post.id).await.unwrap();

    assert_eq!(deleted.id, post.id);
    assert_eq!(fx.blobs.removal_calls(), vec![strings(&["videos/a.mp4"])]);
    assert_eq!(fx.blobs.object_count(), 0);
    assert_eq!(fx.records.post_count(), 0);
    assert_eq!(fx.notifier.names(), vec!["post:upsert", "post:delete"]);
}

#[tokio::test]
async fn test_delete_without_media_skips_blob_store() {
    let fx = Fixture::new();
    let posts = service(&fx);
    let post = posts.create(create_cmd(None, &[], &[])).await.unwrap();

    posts.delete(&post.id).await.unwrap();

    assert!(fx.blobs.removal_calls().is_empty());
    assert_eq!(fx.records.post_count(), 0);
}

/// Blobs are removed first, so a failing row delete leaves the row without
/// its objects.
#[tokio::test]
async fn test_delete_row_failure_after_blob_cleanup() {
    let fx = Fixture::new();
    let posts = service(&fx);
    seed_blobs(&fx, &["videos/a.mp4"]).await;
    let post = posts
        .create(create_cmd(Some("video"), &["https://x/a.mp4"], &["videos/a.mp4"]))
        .await
        .unwrap();
    fx.records.set_fail_post_deletes(true);

    assert!(posts.delete(&post.id).await.is_err());
    assert!(!fx.blobs.contains("videos/a.mp4"));
    assert_eq!(fx.records.post_count(), 1);
    assert_eq!(fx.notifier.names(), vec!["post:upsert"]);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let fx = Fixture::new();
    let posts = service(&fx);

    assert!(matches!(posts.delete("ghost").await, Err(CmsError::NotFound(_))));
    assert!(fx.blobs.removal_calls().is_empty());
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_upsert_merges() {
    let fx = Fixture::new();
    let settings = SettingsService::new(fx.records.clone(), fx.notifier.clone());

    settings.upsert("app", fields(json!({"a": 1}))).await.unwrap();
    let saved = settings.upsert("app", fields(json!({"b": 2}))).await.unwrap();

    assert_eq!(Value::Object(saved.fields.clone()), json!({"a": 1, "b": 2}));
    assert!(saved.created_at.is_some());
    assert_eq!(fx.notifier.names(), vec!["settings:update", "settings:update"]);
    assert_eq!(
        fx.notifier.events().last(),
        Some(&ChangeEvent::SettingsUpdate(saved))
    );
}

#[tokio::test]
async fn test_settings_get_missing_does_not_write() {
    let fx = Fixture::new();
    let settings = SettingsService::new(fx.records.clone(), fx.notifier.clone());

    let doc = settings.get("missing").await.unwrap();

    assert_eq!(doc.id, "missing");
    assert!(doc.fields.is_empty());
    assert_eq!(doc.created_at, None);
    assert_eq!(fx.records.settings_count(), 0);
    assert!(fx.notifier.events().is_empty());
}
