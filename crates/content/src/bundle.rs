//! Embedded documents.
//!
//! A bundle is a JSON metadata object with optional labelled images. Three
//! layouts are accepted, tried in order:
//!
//! 1. [`BundleStep::LengthPrefixed`]: `[u32 header len][JSON header]` followed by
//!    zero or more `[u32 label len][label][u32 image len][image]` entries. All
//!    lengths are little-endian.
//! 2. [`BundleStep::WholeJson`]: the whole buffer is one JSON object.
//! 3. [`BundleStep::BraceExtraction`]: the first brace-delimited span of the
//!    buffer that parses as a JSON object.

use std::{collections::BTreeMap, sync::LazyLock};

use bytes::{BufMut, Bytes, BytesMut};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::trace;

/// Greedy span from the first `{` to the last `}`.
#[allow(clippy::expect_used)]
static BRACE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace pattern compiles"));

/// Opening braces tried by the balanced scan before giving up.
const MAX_BRACE_CANDIDATES: usize = 16;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One step of the decode chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BundleStep {
    /// Length-prefixed header and image entries.
    LengthPrefixed,
    /// Whole buffer parsed as JSON.
    WholeJson,
    /// JSON object extracted from surrounding text.
    BraceExtraction,
}

/// Why a decode step rejected the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    /// Not enough bytes for the header length prefix.
    #[error("buffer of {len} bytes is too short for a length prefix")]
    TooShort {
        /// Buffer length.
        len: usize,
    },

    /// A length prefix points past the end of the buffer.
    #[error("{what} declares {declared} bytes but only {available} remain")]
    Truncated {
        /// Which field was being read.
        what: &'static str,
        /// Declared length.
        declared: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// The candidate text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// The JSON value is not an object.
    #[error("JSON value is not an object")]
    NotAnObject,

    /// An image label is not valid UTF-8.
    #[error("image label is not valid UTF-8")]
    InvalidLabel,

    /// No brace-delimited span parsed as a JSON object.
    #[error("no JSON object found")]
    NoJsonObject,

    /// A field is too long for a 32-bit length prefix.
    #[error("{what} of {len} bytes does not fit a 32-bit length prefix")]
    TooLarge {
        /// Which field overflowed.
        what: &'static str,
        /// Its length.
        len: usize,
    },
}

/// Outcome of a structured decode attempt, reported next to the content view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleNotice {
    /// The payload decoded as an embedded document.
    Decoded {
        /// The step that succeeded.
        step: BundleStep,
    },
    /// Every step failed; the payload is shown as raw bytes.
    Skipped {
        /// Each step with the reason it failed, in order.
        attempts: Vec<(BundleStep, BundleError)>,
    },
}

impl BundleNotice {
    /// Message suitable for end users.
    pub fn summary(&self) -> String {
        match self {
            Self::Decoded { step } => format!("decoded as structured document ({step})"),
            Self::Skipped { .. } => "could not interpret as structured document".to_owned(),
        }
    }
}

/// JSON metadata with labelled images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedDocument {
    /// Metadata object.
    pub metadata: Map<String, Value>,
    /// Images keyed by label.
    pub images: BTreeMap<String, Bytes>,
}

impl EmbeddedDocument {
    /// Run the decode chain, returning the document and the step that
    /// produced it, or every step's failure.
    pub fn decode(bytes: &[u8]) -> Result<(Self, BundleStep), Vec<(BundleStep, BundleError)>> {
        let steps: [(BundleStep, fn(&[u8]) -> Result<Self, BundleError>); 3] = [
            (BundleStep::LengthPrefixed, Self::from_length_prefixed),
            (BundleStep::WholeJson, Self::from_json),
            (BundleStep::BraceExtraction, Self::extract_json),
        ];

        let mut attempts = Vec::with_capacity(steps.len());
        for (step, decode) in steps {
            match decode(bytes) {
                Ok(document) => return Ok((document, step)),
                Err(err) => {
                    trace!(%step, %err, "bundle decode step failed");
                    attempts.push((step, err));
                }
            }
        }
        Err(attempts)
    }

    /// Decode the length-prefixed layout.
    pub fn from_length_prefixed(bytes: &[u8]) -> Result<Self, BundleError> {
        if bytes.len() < 4 {
            return Err(BundleError::TooShort { len: bytes.len() });
        }
        let mut reader = Reader(bytes);
        let metadata = parse_object(reader.take_prefixed("header")?)?;

        let mut images = BTreeMap::new();
        while !reader.0.is_empty() {
            let label = reader.take_prefixed("image label")?;
            let label = std::str::from_utf8(label).map_err(|_| BundleError::InvalidLabel)?;
            let image = reader.take_prefixed("image")?;
            images.insert(label.to_owned(), Bytes::copy_from_slice(image));
        }

        Ok(Self { metadata, images })
    }

    /// Decode a buffer holding exactly one JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, BundleError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        Ok(Self {
            metadata: parse_object(bytes)?,
            images: BTreeMap::new(),
        })
    }

    /// Find a JSON object embedded in surrounding text.
    ///
    /// The greedy first-to-last brace span is tried first, then balanced spans
    /// starting at each opening brace.
    pub fn extract_json(bytes: &[u8]) -> Result<Self, BundleError> {
        let text = String::from_utf8_lossy(bytes);

        if let Some(span) = BRACE_SPAN.find(&text) {
            if let Ok(metadata) = parse_object(span.as_str().as_bytes()) {
                return Ok(Self {
                    metadata,
                    images: BTreeMap::new(),
                });
            }
        }

        text.match_indices('{')
            .take(MAX_BRACE_CANDIDATES)
            .filter_map(|(start, _)| balanced_span(&text, start))
            .find_map(|span| parse_object(span.as_bytes()).ok())
            .map(|metadata| Self {
                metadata,
                images: BTreeMap::new(),
            })
            .ok_or(BundleError::NoJsonObject)
    }

    /// Encode in the length-prefixed layout.
    pub fn to_bytes(&self) -> Result<Bytes, BundleError> {
        let header = serde_json::to_vec(&self.metadata).map_err(|e| BundleError::Json(e.to_string()))?;

        let mut buf = BytesMut::with_capacity(
            4 + header.len()
                + self
                    .images
                    .iter()
                    .map(|(label, image)| 8 + label.len() + image.len())
                    .sum::<usize>(),
        );
        put_prefixed(&mut buf, "header", &header)?;
        for (label, image) in &self.images {
            put_prefixed(&mut buf, "image label", label.as_bytes())?;
            put_prefixed(&mut buf, "image", image)?;
        }
        Ok(buf.freeze())
    }

    /// String value of a metadata field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take_prefixed(&mut self, what: &'static str) -> Result<&'a [u8], BundleError> {
        let Some((len, rest)) = self.0.split_first_chunk::<4>() else {
            return Err(BundleError::Truncated {
                what,
                declared: 4,
                available: self.0.len(),
            });
        };
        let declared = u32::from_le_bytes(*len) as usize;
        let Some((field, rest)) = rest.split_at_checked(declared) else {
            return Err(BundleError::Truncated {
                what,
                declared,
                available: rest.len(),
            });
        };
        self.0 = rest;
        Ok(field)
    }
}

fn put_prefixed(buf: &mut BytesMut, what: &'static str, field: &[u8]) -> Result<(), BundleError> {
    let len = u32::try_from(field.len()).map_err(|_| BundleError::TooLarge {
        what,
        len: field.len(),
    })?;
    buf.put_u32_le(len);
    buf.put_slice(field);
    Ok(())
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, BundleError> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BundleError::NotAnObject),
        Err(e) => Err(BundleError::Json(e.to_string())),
    }
}

/// The span from the `{` at `start` to its matching `}`, skipping braces
/// inside string literals.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.get(start..)?.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return text.get(start..=start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn sample() -> EmbeddedDocument {
        let Value::Object(metadata) = json!({"name": "Lot 12", "type": "property", "rooms": 3}) else {
            unreachable!()
        };
        EmbeddedDocument {
            metadata,
            images: BTreeMap::from([
                ("front".to_owned(), Bytes::from_static(b"\x89PNG front")),
                ("kitchen".to_owned(), Bytes::from_static(b"\xFF\xD8 kitchen")),
            ]),
        }
    }

    #[test]
    fn test_length_prefixed_layout() {
        let doc = EmbeddedDocument {
            metadata: Map::new(),
            images: BTreeMap::from([("a".to_owned(), Bytes::from_static(b"xy"))]),
        };
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(
            bytes.as_ref(),
            b"\x02\x00\x00\x00{}\x01\x00\x00\x00a\x02\x00\x00\x00xy"
        );
    }

    #[test]
    fn test_length_prefixed_decode() {
        let doc = sample();
        let bytes = doc.to_bytes().unwrap();
        let (decoded, step) = EmbeddedDocument::decode(&bytes).unwrap();
        assert_eq!(step, BundleStep::LengthPrefixed);
        assert_eq!(decoded, doc);
        assert_eq!(decoded.field("name"), Some("Lot 12"));
    }

    #[test]
    fn test_truncated_image_rejected() {
        let bytes = sample().to_bytes().unwrap();
        let cut = &bytes[..bytes.len() - 3];
        assert_matches!(
            EmbeddedDocument::from_length_prefixed(cut),
            Err(BundleError::Truncated { what: "image", .. })
        );
    }

    #[test]
    fn test_whole_json() {
        let (doc, step) = EmbeddedDocument::decode(b"\xEF\xBB\xBF {\"name\": \"x\"} ").unwrap();
        assert_eq!(step, BundleStep::WholeJson);
        assert_eq!(doc.field("name"), Some("x"));
        assert!(doc.images.is_empty());
    }

    #[test]
    fn test_brace_extraction_greedy() {
        let (doc, step) = EmbeddedDocument::decode(b"prefix {\"a\": {\"b\": 1}} suffix").unwrap();
        assert_eq!(step, BundleStep::BraceExtraction);
        assert_eq!(doc.metadata["a"]["b"], 1);
    }

    #[test]
    fn test_brace_extraction_balanced() {
        let text = b"note {\"k\": \"v}\"} then {oops}";
        let (doc, step) = EmbeddedDocument::decode(text).unwrap();
        assert_eq!(step, BundleStep::BraceExtraction);
        assert_eq!(doc.field("k"), Some("v}"));
    }

    #[test]
    fn test_all_steps_fail() {
        let attempts = EmbeddedDocument::decode(b"[1, 2, 3]").unwrap_err();
        let steps: Vec<_> = attempts.iter().map(|(step, _)| *step).collect();
        assert_eq!(
            steps,
            vec![BundleStep::LengthPrefixed, BundleStep::WholeJson, BundleStep::BraceExtraction]
        );
        assert_matches!(attempts[1].1, BundleError::NotAnObject);
        assert_matches!(attempts[2].1, BundleError::NoJsonObject);
    }

    #[test]
    fn test_short_buffer() {
        assert_matches!(
            EmbeddedDocument::from_length_prefixed(b"{}"),
            Err(BundleError::TooShort { len: 2 })
        );
    }

    #[test]
    fn test_balanced_span_unmatched() {
        assert_eq!(balanced_span("{\"a\": {}", 0), None);
        assert_eq!(balanced_span("x{}y", 1), Some("{}"));
    }
}
