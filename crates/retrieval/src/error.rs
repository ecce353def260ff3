//! Error types for retrieval.

use std::time::Duration;

use bcat_codec::{ReferenceError, TagError};
use bcat_ledger::LedgerError;
use bcat_primitives::RecordId;

/// Why a single record could not be obtained or unwrapped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    /// The ledger lookup failed (after retries, if the error was transient).
    #[error(transparent)]
    Lookup(#[from] LedgerError),

    /// Every attempt exceeded the lookup timeout.
    #[error("lookup timed out after {after:?}")]
    Timeout {
        /// The per-attempt timeout.
        after: Duration,
    },

    /// The record carries no data output.
    #[error("record has no data output")]
    NoDataOutput,

    /// The part container did not yield a chunk.
    #[error(transparent)]
    Unwrap(#[from] TagError),

    /// Cancellation was requested while the lookup was pending.
    #[error("cancelled")]
    Cancelled,
}

impl FetchFailure {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Lookup(err) => err.is_retryable(),
            Self::Timeout { .. } => true,
            Self::NoDataOutput | Self::Unwrap(_) | Self::Cancelled => false,
        }
    }
}

/// Errors raised while resolving or reconstructing a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    /// The reference record could not be obtained.
    #[error("failed to fetch reference record {id}: {cause}")]
    ReferenceLookup {
        /// Reference record identifier.
        id: RecordId,
        /// Underlying failure.
        cause: FetchFailure,
    },

    /// The reference container could not be decoded.
    #[error("failed to decode reference record: {0}")]
    Reference(#[from] ReferenceError),

    /// The reference lists no chunk identifiers.
    #[error("reference record lists no chunk identifiers")]
    ChunksUndiscoverable,

    /// A chunk could not be fetched; reconstruction was aborted.
    #[error("failed to fetch chunk {index}: {cause}")]
    ChunkFetchFailed {
        /// Zero-based chunk index.
        index: usize,
        /// Underlying failure.
        cause: FetchFailure,
    },

    /// The chunk index is outside the reference's chunk list.
    #[error("chunk index {index} out of range for {total} chunks")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of chunks in the reference.
        total: usize,
    },

    /// Cancellation was requested before chunk `index` was obtained.
    #[error("reconstruction cancelled at chunk {index}")]
    Cancelled {
        /// Index of the chunk that was not obtained.
        index: usize,
    },

    /// The reassembled length differs from the sum of chunk lengths.
    #[error("reassembled {actual} bytes, expected {expected}")]
    LengthMismatch {
        /// Sum of fetched chunk lengths.
        expected: usize,
        /// Length of the output buffer.
        actual: usize,
    },
}

impl RetrievalError {
    /// Map a chunk-level failure to a reconstruction error at `index`.
    pub(crate) fn chunk(index: usize, cause: FetchFailure) -> Self {
        match cause {
            FetchFailure::Cancelled => Self::Cancelled { index },
            cause => Self::ChunkFetchFailed { index, cause },
        }
    }

    /// Index of the failing chunk, if the error concerns one.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::ChunkFetchFailed { index, .. }
            | Self::Cancelled { index }
            | Self::IndexOutOfRange { index, .. } => Some(*index),
            _ => None,
        }
    }
}
