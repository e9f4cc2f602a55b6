//! # Content Errors
//!
//! Error taxonomy shared by the post, settings, and media managers.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for manager operations
pub type CmsResult<T> = Result<T, CmsError>;

/// Errors surfaced by the lifecycle managers
#[derive(Debug, Clone, Error)]
pub enum CmsError {
    /// Bad or missing input, invalid media combination, wrong MIME type
    #[error("{0}")]
    Validation(String),

    /// Referenced id is absent
    #[error("{0}")]
    NotFound(String),

    /// Record store or blob store call failed
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl CmsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            CmsError::Validation(_) => 400,
            CmsError::NotFound(_) => 404,
            CmsError::Store(err) => err.status_code(),
        }
    }

    /// Stable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            CmsError::Validation(_) => "VALIDATION_ERROR",
            CmsError::NotFound(_) => "NOT_FOUND",
            CmsError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CmsError::validation("fields is required").status_code(), 400);
        assert_eq!(CmsError::not_found("post p1 not found").status_code(), 404);
        assert_eq!(
            CmsError::from(StoreError::Backend("boom".into())).status_code(),
            400
        );
        assert_eq!(
            CmsError::from(StoreError::RowNotFound("p1".into())).status_code(),
            404
        );
    }

    #[test]
    fn test_message_is_surfaced_verbatim() {
        let err = CmsError::validation("Images must be PNG/JPG");
        assert_eq!(err.to_string(), "Images must be PNG/JPG");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
