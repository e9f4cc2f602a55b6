//! # Post Model
//!
//! Stored rows, row-level writes, and the request shapes accepted at the HTTP
//! boundary. Requests are loosely shaped JSON; they are converted once into
//! `CreatePost` / `UpdatePost` so the lifecycle manager only sees typed data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::CmsError;
use crate::media::MediaType;
use crate::store::record::null_as_default;

/// Open key-value document stored with every post
pub type Fields = Map<String, Value>;

/// A stored post row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Fields,
    pub media_type: Option<MediaType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_paths: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written on insert; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub fields: Fields,
    pub media_type: Option<MediaType>,
    pub media_urls: Vec<String>,
    pub media_paths: Vec<String>,
}

/// Partial row update. Only `Some` columns are written; `media_type:
/// Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<Option<MediaType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_paths: Option<Vec<String>>,
}

impl PostPatch {
    /// Apply this patch to a row in place
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(fields) = &self.fields {
            post.fields = fields.clone();
        }
        if let Some(media_type) = self.media_type {
            post.media_type = media_type;
        }
        if let Some(urls) = &self.media_urls {
            post.media_urls = urls.clone();
        }
        if let Some(paths) = &self.media_paths {
            post.media_paths = paths.clone();
        }
    }
}

/// Response body for a deleted post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedPost {
    pub id: String,
}

// ==================
// Boundary requests
// ==================

/// `POST /posts` body as received
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub fields: Option<Value>,
    #[serde(default)]
    pub media_type: Option<Value>,
    #[serde(default)]
    pub media_urls: Option<Value>,
    #[serde(default)]
    pub media_paths: Option<Value>,
}

/// `PUT /posts/:id` body as received. `present` keeps an explicit `null`
/// distinguishable from a missing key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "present")]
    pub fields: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub media_type: Option<Value>,
    #[serde(default)]
    pub media_urls: Option<Value>,
    #[serde(default)]
    pub media_paths: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validated create command
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePost {
    pub fields: Fields,
    /// Raw kind as sent; resolved against the URL list by the manager
    pub media_type: Option<String>,
    pub media_urls: Vec<String>,
    pub media_paths: Vec<String>,
}

/// Validated update command; `None` means "not provided"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePost {
    pub fields: Option<Fields>,
    /// `Some(None)` is an explicit null
    pub media_type: Option<Option<String>>,
    pub media_urls: Option<Vec<String>>,
    pub media_paths: Option<Vec<String>>,
}

impl TryFrom<CreatePostRequest> for CreatePost {
    type Error = CmsError;

    fn try_from(req: CreatePostRequest) -> Result<Self, Self::Error> {
        let fields = match req.fields {
            Some(Value::Object(map)) => map,
            _ => return Err(CmsError::validation("fields is required")),
        };

        Ok(CreatePost {
            fields,
            media_type: req.media_type.and_then(raw_media_type),
            media_urls: req.media_urls.and_then(string_list).unwrap_or_default(),
            media_paths: req.media_paths.and_then(string_list).unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdatePostRequest> for UpdatePost {
    type Error = CmsError;

    fn try_from(req: UpdatePostRequest) -> Result<Self, Self::Error> {
        let fields = match req.fields {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => return Err(CmsError::validation("fields must be an object")),
        };

        Ok(UpdatePost {
            fields,
            media_type: req.media_type.map(raw_media_type),
            media_urls: req.media_urls.and_then(string_list),
            media_paths: req.media_paths.and_then(string_list),
        })
    }
}

/// Keep the raw text of a media kind; `null` means none
fn raw_media_type(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Arrays of strings only; anything else counts as malformed
fn string_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
