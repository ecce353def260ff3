//! MIME-based routing.

use bcat_codec::{Compression, ReferenceRecord};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    bundle::{BundleNotice, EmbeddedDocument},
    handle::DisplayHandle,
    kind::{ContentKind, essence},
    options::ClassifyOptions,
};

/// File name suffixes that mark a text payload as a structured bundle.
const BUNDLE_SUFFIXES: [&str; 2] = [".json", ".bundle"];

/// What a caller can show for a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentView {
    /// Image or video bytes for a renderer.
    Display(DisplayHandle),
    /// Decoded text.
    Text(String),
    /// A decoded embedded document.
    Document(EmbeddedDocument),
    /// Raw bytes; only retrieval is offered.
    Binary(Bytes),
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// Category derived from the declared MIME type.
    pub kind: ContentKind,
    /// How the payload should be presented.
    pub view: ContentView,
    /// Outcome of the embedded document decode, when one was attempted.
    pub notice: Option<BundleNotice>,
    /// Declared compression of the payload.
    pub compression: Compression,
}

/// Route `bytes` by `mime_type`.
///
/// `filename_hint` and `options` only decide whether a text payload goes
/// through the embedded document decode first.
pub fn classify(
    bytes: impl Into<Bytes>,
    mime_type: &str,
    filename_hint: Option<&str>,
    options: &ClassifyOptions,
) -> Classified {
    let bytes = bytes.into();
    let kind = ContentKind::from_mime(mime_type);
    debug!(%kind, mime = mime_type, len = bytes.len(), "classifying payload");

    let (view, notice) = match kind {
        ContentKind::Image | ContentKind::Video => {
            (ContentView::Display(DisplayHandle::new(mime_type, bytes)), None)
        }
        ContentKind::Binary => (ContentView::Binary(bytes), None),
        ContentKind::Text if wants_bundle(mime_type, filename_hint, options) => {
            match EmbeddedDocument::decode(&bytes) {
                Ok((document, step)) => (
                    ContentView::Document(document),
                    Some(BundleNotice::Decoded { step }),
                ),
                Err(attempts) => {
                    debug!(attempts = attempts.len(), "structured decode skipped");
                    (json_or_binary(bytes), Some(BundleNotice::Skipped { attempts }))
                }
            }
        }
        ContentKind::Text => (
            ContentView::Text(String::from_utf8_lossy(&bytes).into_owned()),
            None,
        ),
    };

    Classified {
        kind,
        view,
        notice,
        compression: Compression::None,
    }
}

/// Classify a reassembled payload using the metadata of its reference record.
///
/// Payloads declared as compressed are never decompressed; they are always
/// surfaced as raw bytes.
pub fn classify_record(
    bytes: impl Into<Bytes>,
    record: &ReferenceRecord,
    options: &ClassifyOptions,
) -> Classified {
    let hint = (!record.filename.is_empty()).then_some(record.filename.as_str());

    if record.compression != Compression::None {
        warn!(filename = %record.filename, "payload declared compressed, not decoding");
        return Classified {
            kind: ContentKind::from_mime(&record.mime_type),
            view: ContentView::Binary(bytes.into()),
            notice: None,
            compression: record.compression,
        };
    }

    classify(bytes, &record.mime_type, hint, options)
}

/// Valid JSON that is not a document is still readable as text.
fn json_or_binary(bytes: Bytes) -> ContentView {
    if serde_json::from_slice::<serde_json::Value>(&bytes).is_ok() {
        ContentView::Text(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        ContentView::Binary(bytes)
    }
}

fn wants_bundle(mime_type: &str, filename_hint: Option<&str>, options: &ClassifyOptions) -> bool {
    options.attempt_bundle_decode
        || essence(mime_type) == "application/json"
        || filename_hint.is_some_and(|name| {
            let name = name.to_ascii_lowercase();
            BUNDLE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        })
}
