//! # Media Kinds
//!
//! The four attachment kinds a post can carry, grouped into image and video
//! families. Popup variants share the upload endpoint of their family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used whenever a media kind cannot be resolved
pub const INVALID_MEDIA_TYPE: &str =
    "mediaType must be images/video/popup_images/popup_video when mediaUrls is provided";

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Images,
    Video,
    PopupImages,
    PopupVideo,
}

/// Upload family a media kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    Image,
    Video,
}

impl MediaType {
    /// All valid kinds, in wire order
    pub const ALL: [MediaType; 4] = [
        MediaType::Images,
        MediaType::Video,
        MediaType::PopupImages,
        MediaType::PopupVideo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Images => "images",
            MediaType::Video => "video",
            MediaType::PopupImages => "popup_images",
            MediaType::PopupVideo => "popup_video",
        }
    }

    /// Family whose upload endpoint produces paths for this kind
    pub fn family(&self) -> MediaFamily {
        match self {
            MediaType::Images | MediaType::PopupImages => MediaFamily::Image,
            MediaType::Video | MediaType::PopupVideo => MediaFamily::Video,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for strings outside the four known kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown media type: {0}")]
pub struct UnknownMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownMediaType(s.to_string()))
    }
}

impl MediaFamily {
    /// Storage folder uploads of this family are written under
    pub fn folder(&self) -> &'static str {
        match self {
            MediaFamily::Image => "images",
            MediaFamily::Video => "videos",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_kinds() {
        for kind in MediaType::ALL {
            assert_eq!(kind.as_str().parse::<MediaType>().unwrap(), kind);
        }
        assert_eq!(
            "gif".parse::<MediaType>().map_err(|e| e.to_string()),
            Err("unknown media type: gif".to_string())
        );
        assert!("Images".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_families() {
        assert_eq!(MediaType::Images.family(), MediaFamily::Image);
        assert_eq!(MediaType::PopupImages.family(), MediaFamily::Image);
        assert_eq!(MediaType::Video.family(), MediaFamily::Video);
        assert_eq!(MediaType::PopupVideo.family(), MediaFamily::Video);
        assert_eq!(MediaFamily::Video.folder(), "videos");
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&MediaType::PopupVideo).unwrap();
        assert_eq!(json, "\"popup_video\"");
        let parsed: MediaType = serde_json::from_str("\"popup_images\"").unwrap();
        assert_eq!(parsed, MediaType::PopupImages);
    }
}
