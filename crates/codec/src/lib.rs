//! BCAT container codec.
//!
//! Builds on the push codec in [`bcat_script`] to produce and read the two
//! container kinds of the format:
//!
//! - **Part containers** - `[marker][part namespace][chunk bytes]`, one per chunk.
//!   Produced by [`ChunkEncoder`], read by [`Tagger::unwrap_script`].
//! - **Reference containers** - `[marker][reference namespace][info][mime]
//!   [charset][filename][flag][id]...`, one per file. Produced by
//!   [`encode_reference`], read by [`decode_reference`].
//!
//! Decoding is tolerant of producer variants: namespaces are located through
//! an ordered list of [`MatchStrategy`] values, and reference records fall back
//! to a legacy JSON metadata push when no namespace is present.
//!
//! Nothing in this crate performs I/O.

mod chunk;
mod error;
mod legacy;
mod reference;
mod tagger;

pub use chunk::{Chunk, ChunkEncoder, DEFAULT_MAX_CHUNK_BYTES, EncoderConfig, split};
pub use error::{EncodeError, ReferenceError, TagError};
pub use legacy::LegacyMetadata;
pub use reference::{
    Compression, DecodedReference, MAX_MIME_BYTES, ReferenceFormat, ReferenceRecord,
    decode_reference, encode_reference,
};
pub use tagger::{DEFAULT_STRATEGIES, Located, MatchStrategy, Tagger, Unwrapped};

pub use bcat_primitives::{Namespace, RecordId};
