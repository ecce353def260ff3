//! Legacy JSON metadata.
//!
//! Older producers published file metadata as a single JSON object push with
//! short keys instead of the positional reference layout. Those records name
//! the file but carry no chunk identifiers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// File metadata from a legacy JSON push.
///
/// Key names are short for compatibility with published records:
/// `n` filename, `m` MIME type, `c` chunk count, `i` info, `t` title,
/// `d` description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyMetadata {
    /// File name.
    #[serde(rename = "n", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Declared MIME type.
    #[serde(rename = "m", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Declared number of chunks.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<u64>,
    /// Free-form info string.
    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Optional title.
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description.
    #[serde(rename = "d", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LegacyMetadata {
    /// Parse a push as legacy metadata if it looks like a JSON object.
    pub fn from_push(push: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(push);
        let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if !text.starts_with('{') {
            return None;
        }
        match serde_json::from_str(text) {
            Ok(meta) => Some(meta),
            Err(e) => {
                trace!(error = %e, "push looks like JSON but is not legacy metadata");
                None
            }
        }
    }

    /// Find the first push holding legacy metadata.
    pub fn scan(pushes: &[Bytes]) -> Option<Self> {
        pushes.iter().find_map(|push| Self::from_push(push))
    }

    /// Serialize with the short key names.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_keys() {
        let meta = LegacyMetadata {
            filename: Some("cat.png".into()),
            mime_type: Some("image/png".into()),
            chunk_count: Some(3),
            ..Default::default()
        };
        assert_eq!(meta.to_json().unwrap(), r#"{"n":"cat.png","m":"image/png","c":3}"#);
    }

    #[test]
    fn test_from_push() {
        let meta = LegacyMetadata::from_push(br#"  {"n":"a.txt","t":"Title","x":1}"#).unwrap();
        assert_eq!(meta.filename.as_deref(), Some("a.txt"));
        assert_eq!(meta.title.as_deref(), Some("Title"));
        assert_eq!(meta.mime_type, None);
    }

    #[test]
    fn test_non_json_push() {
        assert!(LegacyMetadata::from_push(b"15DHFxWZJT58f9nhyGnsRBqrgwK4W6h4Up").is_none());
        assert!(LegacyMetadata::from_push(b"{broken").is_none());
    }

    #[test]
    fn test_scan_skips_unparseable_candidates() {
        let pushes = vec![
            Bytes::from_static(b"{not json"),
            Bytes::from_static(br#"{"m":"text/plain"}"#),
        ];
        let meta = LegacyMetadata::scan(&pushes).unwrap();
        assert_eq!(meta.mime_type.as_deref(), Some("text/plain"));
    }
}
