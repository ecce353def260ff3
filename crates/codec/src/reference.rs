//! Reference record encoding and decoding.
//!
//! Layout, one push per field after the marker:
//!
//! ```text
//! [reference namespace]
//! [info]
//! [MIME type, at most 128 bytes]
//! [charset, or 0x00 for binary]
//! [filename, or 0x00 when unnamed]
//! [compression flag: 0x00 none, 0x01 gzip]
//! [chunk id 0, 32 bytes reversed]
//! ...
//! [chunk id n-1]
//! ```
//!
//! The order of the identifier pushes is the only record of chunk order.

use bcat_primitives::{Namespace, RecordId};
use bcat_script::{Script, decode_pushes};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    error::{EncodeError, ReferenceError},
    legacy::LegacyMetadata,
    tagger::{Located, MatchStrategy},
};

/// Longest MIME type stored in a reference record.
pub const MAX_MIME_BYTES: usize = 128;

/// Placeholder pushed for absent text fields.
const NULL_FIELD: &[u8] = &[0x00];

/// Declared compression of the reassembled payload.
///
/// The flag is carried as metadata only; payloads are never decompressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    /// Stored as-is.
    #[default]
    None,
    /// Declared as gzip.
    Gzip,
}

impl Compression {
    /// Flag byte written to the record.
    pub const fn flag(&self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Gzip => 0x01,
        }
    }

    /// Interpret a flag push. Any non-zero content reads as gzip.
    pub fn from_flag(push: &[u8]) -> Self {
        if push.iter().all(|b| *b == 0) {
            Self::None
        } else {
            Self::Gzip
        }
    }
}

/// Metadata and ordered chunk list of a chunked file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// File name, empty when unnamed.
    pub filename: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Character set of text payloads; `None` for binary.
    pub charset: Option<String>,
    /// Declared compression.
    pub compression: Compression,
    /// Free-form info string.
    pub info: String,
    /// Part record identifiers in reassembly order.
    pub chunk_ids: Vec<RecordId>,
}

impl ReferenceRecord {
    /// Record for `filename` with the given MIME type and chunk list.
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        chunk_ids: Vec<RecordId>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            chunk_ids,
            ..Default::default()
        }
    }

    /// Set the charset.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Set the info string.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Set the compression flag.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Number of chunks, always equal to the identifier count.
    pub fn chunk_count(&self) -> usize {
        self.chunk_ids.len()
    }

    /// False when the record was found but its chunks cannot be located.
    pub fn is_discoverable(&self) -> bool {
        !self.chunk_ids.is_empty()
    }
}

/// Layout a reference record was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceFormat {
    /// Positional layout with namespace and identifier pushes.
    Standard,
    /// Legacy JSON metadata; chunk identifiers are not available.
    Legacy(LegacyMetadata),
}

/// Result of [`decode_reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReference {
    /// The decoded record.
    pub record: ReferenceRecord,
    /// Which layout was found.
    pub format: ReferenceFormat,
}

/// Encode `record` as a reference container.
///
/// A MIME type longer than [`MAX_MIME_BYTES`] is truncated, not rejected.
pub fn encode_reference(record: &ReferenceRecord) -> Result<Script, EncodeError> {
    if record.chunk_ids.is_empty() {
        return Err(EncodeError::EmptyChunkList);
    }

    let mime = truncate_utf8(&record.mime_type, MAX_MIME_BYTES);
    if mime.len() < record.mime_type.len() {
        warn!(
            len = record.mime_type.len(),
            max = MAX_MIME_BYTES,
            "truncating MIME type in reference record"
        );
    }

    let charset = record
        .charset
        .as_deref()
        .map_or(NULL_FIELD, str::as_bytes);
    let filename = if record.filename.is_empty() {
        NULL_FIELD
    } else {
        record.filename.as_bytes()
    };

    let builder = Script::builder()
        .push(Namespace::REFERENCE.as_bytes())?
        .push(record.info.as_bytes())?
        .push(mime.as_bytes())?
        .push(charset)?
        .push(filename)?
        .push([record.compression.flag()])?;

    let script = builder
        .push_all(record.chunk_ids.iter().map(RecordId::to_wire))?
        .build();
    debug!(
        chunks = record.chunk_ids.len(),
        len = script.len(),
        "encoded reference record"
    );
    Ok(script)
}

/// Decode a reference container.
///
/// When the reference namespace is absent, the first push holding legacy JSON
/// metadata is used instead and the returned record has no chunk identifiers.
pub fn decode_reference(script: &[u8]) -> Result<DecodedReference, ReferenceError> {
    let pushes = decode_pushes(script)?;

    let located = [MatchStrategy::ExactBytes, MatchStrategy::Utf8Text]
        .iter()
        .find_map(|strategy| strategy.locate(Namespace::REFERENCE, &pushes));

    match located {
        Some(Located::After(index)) => {
            let fields = pushes.get(index + 1..).unwrap_or_default();
            decode_fields(fields).map(|record| DecodedReference {
                record,
                format: ReferenceFormat::Standard,
            })
        }
        _ => {
            let meta = LegacyMetadata::scan(&pushes).ok_or(ReferenceError::NamespaceNotFound)?;
            warn!("reference namespace not found, using legacy metadata");
            let record = ReferenceRecord {
                filename: meta.filename.clone().unwrap_or_default(),
                mime_type: meta.mime_type.clone().unwrap_or_default(),
                info: meta.info.clone().unwrap_or_default(),
                ..Default::default()
            };
            Ok(DecodedReference {
                record,
                format: ReferenceFormat::Legacy(meta),
            })
        }
    }
}

fn decode_fields(fields: &[Bytes]) -> Result<ReferenceRecord, ReferenceError> {
    let mut fields = fields.iter();
    let mut next = |field: &'static str| fields.next().ok_or(ReferenceError::MissingField { field });

    let info = text_field(next("info")?, "info")?.unwrap_or_default();
    let mime_type = text_field(next("mime")?, "mime")?.unwrap_or_default();
    let charset = text_field(next("charset")?, "charset")?;
    let filename = text_field(next("filename")?, "filename")?.unwrap_or_default();
    let compression = Compression::from_flag(next("flag")?);

    let chunk_ids = fields
        .enumerate()
        .map(|(index, push)| {
            RecordId::from_wire(push).map_err(|_| ReferenceError::InvalidIdentifier {
                index,
                len: push.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReferenceRecord {
        filename,
        mime_type,
        charset,
        compression,
        info,
        chunk_ids,
    })
}

/// Text field where an empty push or a single NUL means absent.
fn text_field(push: &[u8], field: &'static str) -> Result<Option<String>, ReferenceError> {
    if push.is_empty() || push == NULL_FIELD {
        return Ok(None);
    }
    std::str::from_utf8(push)
        .map(|s| Some(s.to_owned()))
        .map_err(|_| ReferenceError::InvalidUtf8 { field })
}

/// Longest prefix of `s` within `max` bytes that ends on a char boundary.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
    s.get(..end).unwrap_or_default()
}
