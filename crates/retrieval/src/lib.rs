//! Retrieval of chunked files.
//!
//! Given a reference record, [`Retriever`] fetches every part record in the
//! order the reference lists them, unwraps each part container and appends
//! the chunk to a single buffer.
//!
//! # Ordering
//!
//! Lookups are strictly sequential and in ascending index order. Nothing is
//! prefetched or run concurrently; order comes only from the identifier list.
//!
//! # Failure
//!
//! Transient lookup failures (transport errors, timeouts) are retried with
//! exponential backoff up to [`RetrievalConfig::max_attempts`]. Any chunk that
//! still fails aborts the whole reconstruction with
//! [`RetrievalError::ChunkFetchFailed`]; no partial payload is returned.
//! [`Retriever::fetch_chunk`] lets callers that persist chunks themselves
//! re-fetch individual indices.

mod backoff;
mod config;
mod error;
mod metrics;
mod progress;
mod retriever;

pub use backoff::Backoff;
pub use config::RetrievalConfig;
pub use error::{FetchFailure, RetrievalError};
pub use progress::Progress;
pub use retriever::{ReconstructedPayload, Retriever};

pub use tokio_util::sync::CancellationToken;
