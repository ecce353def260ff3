//! Display handles for image and video payloads.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;

use crate::kind::essence;

/// Bytes ready to hand to a renderer, tagged with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayHandle {
    mime_type: String,
    bytes: Bytes,
}

impl DisplayHandle {
    /// Wrap `bytes` declared as `mime_type`.
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// The declared MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The payload.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consume the handle and return the payload.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// `data:<mime>;base64,<payload>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", essence(&self.mime_type), STANDARD.encode(&self.bytes))
    }

    /// File extension suggested by the MIME subtype, e.g. `png` or `svg`.
    pub fn extension(&self) -> Option<&str> {
        let subtype = self.mime_type.split(';').next()?.split('/').nth(1)?.trim();
        let subtype = subtype.split('+').next()?;
        match subtype {
            "" => None,
            "jpeg" => Some("jpg"),
            "quicktime" => Some("mov"),
            other if other.bytes().all(|b| b.is_ascii_alphanumeric()) => Some(other),
            _ => None,
        }
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let handle = DisplayHandle::new("image/png", &b"\x89PNG"[..]);
        assert_eq!(handle.data_uri(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_data_uri_strips_parameters() {
        let handle = DisplayHandle::new("Image/GIF; foo=bar", Bytes::new());
        assert_eq!(handle.data_uri(), "data:image/gif;base64,");
    }

    #[test]
    fn test_extension() {
        assert_eq!(DisplayHandle::new("image/png", Bytes::new()).extension(), Some("png"));
        assert_eq!(DisplayHandle::new("image/jpeg", Bytes::new()).extension(), Some("jpg"));
        assert_eq!(DisplayHandle::new("image/svg+xml", Bytes::new()).extension(), Some("svg"));
        assert_eq!(DisplayHandle::new("video/mp4", Bytes::new()).extension(), Some("mp4"));
        assert_eq!(DisplayHandle::new("garbage", Bytes::new()).extension(), None);
        assert_eq!(DisplayHandle::new("image/../x", Bytes::new()).extension(), None);
    }
}
