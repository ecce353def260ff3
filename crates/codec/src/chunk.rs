//! Chunk encoding.
//!
//! Splits a payload into ordered, size-bounded slices and wraps each slice in
//! a part container. Chunks carry no index on the ledger; their order is
//! recorded only by the reference record that lists them.

use bcat_script::Script;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::EncodeError, tagger::Tagger};

/// Default maximum chunk payload size in bytes.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 90_000;

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Maximum payload bytes per chunk.
    pub max_chunk_bytes: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
        }
    }
}

/// One ordered slice of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    total: usize,
    payload: Bytes,
}

impl Chunk {
    /// Zero-based position of this chunk.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of chunks the payload was split into.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The chunk bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Wrap this chunk in a part container.
    pub fn to_container(&self) -> Result<Script, EncodeError> {
        Tagger::part().wrap(&self.payload)
    }
}

/// Split `payload` into chunks of at most `max_chunk_bytes`.
///
/// Produces `ceil(len / max_chunk_bytes)` chunks in byte order with no
/// padding. An empty payload produces a single empty chunk so that every
/// payload, including the empty one, has a reference record.
pub fn split(payload: impl Into<Bytes>, max_chunk_bytes: usize) -> Result<Vec<Chunk>, EncodeError> {
    if max_chunk_bytes == 0 {
        return Err(EncodeError::InvalidChunkSize);
    }
    let payload = payload.into();
    if payload.is_empty() {
        return Ok(vec![Chunk {
            index: 0,
            total: 1,
            payload,
        }]);
    }

    let total = payload.len().div_ceil(max_chunk_bytes);
    let chunks = (0..total)
        .map(|index| {
            let start = index * max_chunk_bytes;
            let end = (start + max_chunk_bytes).min(payload.len());
            Chunk {
                index,
                total,
                payload: payload.slice(start..end),
            }
        })
        .collect();
    Ok(chunks)
}

/// Turns payloads into part containers.
#[derive(Debug, Clone, Default)]
pub struct ChunkEncoder {
    config: EncoderConfig,
}

impl ChunkEncoder {
    /// Create an encoder, validating the chunk size.
    pub fn new(config: EncoderConfig) -> Result<Self, EncodeError> {
        if config.max_chunk_bytes == 0 {
            return Err(EncodeError::InvalidChunkSize);
        }
        Ok(Self { config })
    }

    /// The encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Split `payload` according to the configured chunk size.
    pub fn split(&self, payload: impl Into<Bytes>) -> Result<Vec<Chunk>, EncodeError> {
        split(payload, self.config.max_chunk_bytes)
    }

    /// Split `payload` and wrap every chunk, returning containers in order.
    pub fn encode(&self, payload: impl Into<Bytes>) -> Result<Vec<Script>, EncodeError> {
        let chunks = self.split(payload)?;
        debug!(
            chunks = chunks.len(),
            max_chunk_bytes = self.config.max_chunk_bytes,
            "encoding part containers"
        );
        chunks.iter().map(Chunk::to_container).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_split_exact_boundary() {
        let payload: Vec<u8> = (0..130_000u32).map(|i| (i % 251) as u8).collect();
        let chunks = split(payload.clone(), 65_000).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].payload().len(), 65_000);
        assert_eq!(chunks[1].payload().len(), 65_000);
        assert_eq!(chunks[1].index(), 1);
        assert_eq!(chunks[1].total(), 2);
    }

    #[test]
    fn test_split_remainder() {
        let chunks = split(vec![1u8; 10], 4).unwrap();
        let sizes: Vec<_> = chunks.iter().map(|c| c.payload().len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_split_empty_payload() {
        let chunks = split(Vec::new(), 10).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].payload().is_empty());
    }

    #[test]
    fn test_split_zero_size() {
        assert_matches!(split(vec![1u8], 0), Err(EncodeError::InvalidChunkSize));
        assert_matches!(
            ChunkEncoder::new(EncoderConfig { max_chunk_bytes: 0 }),
            Err(EncodeError::InvalidChunkSize)
        );
    }

    #[test]
    fn test_encode_wraps_each_chunk() {
        let encoder = ChunkEncoder::new(EncoderConfig { max_chunk_bytes: 3 }).unwrap();
        let scripts = encoder.encode(b"abcdefg".to_vec()).unwrap();
        assert_eq!(scripts.len(), 3);
        let tagger = Tagger::part();
        let parts: Vec<Bytes> = scripts
            .iter()
            .map(|s| tagger.unwrap_script(s.as_bytes()).unwrap().payload)
            .collect();
        assert_eq!(parts, vec![
            Bytes::from_static(b"abc"),
            Bytes::from_static(b"def"),
            Bytes::from_static(b"g"),
        ]);
    }

    proptest! {
        #[test]
        fn test_split_concatenates_back(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            size in 1usize..300,
        ) {
            let chunks = split(data.clone(), size).unwrap();
            prop_assert!(chunks.iter().all(|c| c.payload().len() <= size));
            prop_assert!(chunks.iter().enumerate().all(|(i, c)| c.index() == i));
            let joined: Vec<u8> = chunks.iter().flat_map(|c| c.payload().to_vec()).collect();
            prop_assert_eq!(joined, data);
        }
    }
}
