//! Content kinds.

use serde::{Deserialize, Serialize};

/// Broad category of a payload, derived from its declared MIME type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    /// `image/*`.
    Image,
    /// `text/*` and `application/json`.
    Text,
    /// `video/*`.
    Video,
    /// Everything else.
    Binary,
}

impl ContentKind {
    /// Classify a MIME type. Matching ignores case and parameters.
    pub fn from_mime(mime: &str) -> Self {
        let essence = essence(mime);
        if essence.starts_with("image/") {
            Self::Image
        } else if essence.starts_with("text/") || essence == "application/json" {
            Self::Text
        } else if essence.starts_with("video/") {
            Self::Video
        } else {
            Self::Binary
        }
    }

    /// Whether payloads of this kind are shown through a [`DisplayHandle`](crate::DisplayHandle).
    pub const fn is_displayable(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// `type/subtype` in lowercase, without parameters.
pub(crate) fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
