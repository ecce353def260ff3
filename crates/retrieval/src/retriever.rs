//! Sequential reconstruction of chunked files.

use bcat_codec::{Compression, DecodedReference, ReferenceRecord, Tagger, decode_reference};
use bcat_ledger::{LedgerLookup, RawRecord};
use bcat_primitives::RecordId;
use bytes::{Bytes, BytesMut};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    backoff::Backoff,
    config::RetrievalConfig,
    error::{FetchFailure, RetrievalError},
    metrics,
    progress::Progress,
};

/// A reassembled file together with the metadata it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedPayload {
    /// Chunk payloads concatenated in index order.
    pub bytes: Bytes,
    /// MIME type from the reference record.
    pub mime_type: String,
    /// File name from the reference record, empty when unnamed.
    pub filename: String,
    /// Declared compression. The bytes are never decompressed.
    pub compression: Compression,
}

impl ReconstructedPayload {
    /// Length of the reassembled payload.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Fetches and reassembles chunked files through a [`LedgerLookup`].
#[derive(Debug)]
pub struct Retriever<L> {
    ledger: L,
    config: RetrievalConfig,
    tagger: Tagger,
}

impl<L: LedgerLookup> Retriever<L> {
    /// Create a retriever over `ledger`.
    pub fn new(ledger: L, config: RetrievalConfig) -> Self {
        Self {
            ledger,
            config,
            tagger: Tagger::part(),
        }
    }

    /// Replace the tagger used to unwrap part containers.
    pub fn with_tagger(mut self, tagger: Tagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Fetch and decode the reference record published under `id`.
    ///
    /// A reference decoded from legacy metadata is returned as is; its record
    /// has no chunk identifiers and [`reconstruct`](Self::reconstruct) will
    /// report [`RetrievalError::ChunksUndiscoverable`].
    pub async fn resolve(
        &self,
        id: &RecordId,
        cancel: &CancellationToken,
    ) -> Result<DecodedReference, RetrievalError> {
        let container = self
            .fetch_container(id, cancel)
            .await
            .map_err(|cause| RetrievalError::ReferenceLookup { id: *id, cause })?;
        let decoded = decode_reference(&container)?;
        debug!(
            %id,
            filename = %decoded.record.filename,
            mime = %decoded.record.mime_type,
            chunks = decoded.record.chunk_count(),
            "resolved reference record"
        );
        Ok(decoded)
    }

    /// Fetch and unwrap the single chunk at `index`.
    ///
    /// Lookups are read-only, so callers that keep chunks themselves can use
    /// this to fill in only the indices that failed.
    pub async fn fetch_chunk(
        &self,
        record: &ReferenceRecord,
        index: usize,
        cancel: &CancellationToken,
    ) -> Result<Bytes, RetrievalError> {
        let id = record.chunk_ids.get(index).ok_or(RetrievalError::IndexOutOfRange {
            index,
            total: record.chunk_count(),
        })?;
        self.fetch_part(id, cancel)
            .await
            .map_err(|cause| RetrievalError::chunk(index, cause))
    }

    /// Fetch every chunk of `record` in index order and concatenate them.
    ///
    /// `on_progress` is called once per appended chunk. The first chunk that
    /// cannot be obtained aborts the reconstruction; later indices are never
    /// looked up.
    pub async fn reconstruct<F>(
        &self,
        record: &ReferenceRecord,
        on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<ReconstructedPayload, RetrievalError>
    where
        F: FnMut(&Progress<'_>),
    {
        let span = info_span!("reconstruct", chunks = record.chunk_count());
        self.reconstruct_inner(record, on_progress, cancel)
            .instrument(span)
            .await
    }

    /// Resolve the reference under `id` and reconstruct its file.
    pub async fn fetch_file<F>(
        &self,
        id: &RecordId,
        on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<(DecodedReference, ReconstructedPayload), RetrievalError>
    where
        F: FnMut(&Progress<'_>),
    {
        let decoded = self.resolve(id, cancel).await?;
        let payload = self.reconstruct(&decoded.record, on_progress, cancel).await?;
        Ok((decoded, payload))
    }

    async fn reconstruct_inner<F>(
        &self,
        record: &ReferenceRecord,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<ReconstructedPayload, RetrievalError>
    where
        F: FnMut(&Progress<'_>),
    {
        if !record.is_discoverable() {
            return Err(RetrievalError::ChunksUndiscoverable);
        }

        let total = record.chunk_count();
        info!(filename = %record.filename, mime = %record.mime_type, "starting reconstruction");

        let mut parts = Vec::with_capacity(total);
        let mut received = 0usize;

        for (index, id) in record.chunk_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(RetrievalError::Cancelled { index });
            }
            if index > 0 {
                self.throttle(cancel)
                    .await
                    .map_err(|cause| RetrievalError::chunk(index, cause))?;
            }

            let chunk = match self.fetch_part(id, cancel).await {
                Ok(chunk) => chunk,
                Err(cause) => {
                    if cause != FetchFailure::Cancelled {
                        metrics::record_chunk_failure();
                        warn!(index, %id, %cause, "chunk fetch failed, aborting reconstruction");
                    }
                    return Err(RetrievalError::chunk(index, cause));
                }
            };

            metrics::record_chunk_fetched(chunk.len());
            received += chunk.len();
            debug!(index, len = chunk.len(), received, "fetched chunk");

            on_progress(&Progress {
                index,
                completed: index + 1,
                total,
                received_bytes: received,
                chunk: &chunk,
            });
            parts.push(chunk);
        }

        let bytes = assemble(&parts, received)?;
        metrics::record_reconstructed(bytes.len());
        info!(bytes = bytes.len(), "reconstruction complete");

        Ok(ReconstructedPayload {
            bytes,
            mime_type: record.mime_type.clone(),
            filename: record.filename.clone(),
            compression: record.compression,
        })
    }

    async fn throttle(&self, cancel: &CancellationToken) -> Result<(), FetchFailure> {
        let delay = self.config.throttle();
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchFailure::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn fetch_part(
        &self,
        id: &RecordId,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchFailure> {
        let container = self.fetch_container(id, cancel).await?;
        let unwrapped = self.tagger.unwrap_script(&container)?;
        Ok(unwrapped.payload)
    }

    async fn fetch_container(
        &self,
        id: &RecordId,
        cancel: &CancellationToken,
    ) -> Result<Bytes, FetchFailure> {
        self.lookup(id, cancel)
            .await?
            .container()
            .ok_or(FetchFailure::NoDataOutput)
    }

    /// One lookup with timeout, retries and cancellation.
    async fn lookup(
        &self,
        id: &RecordId,
        cancel: &CancellationToken,
    ) -> Result<RawRecord, FetchFailure> {
        let timeout = self.config.lookup_timeout();
        let attempts = self.config.attempts();
        let mut backoff = Backoff::from_config(&self.config);
        let mut attempt = 1;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                result = tokio::time::timeout(timeout, self.ledger.fetch(id)) => result,
            };

            let failure = match result {
                Ok(Ok(record)) => return Ok(record),
                Ok(Err(err)) => FetchFailure::Lookup(err),
                Err(_) => FetchFailure::Timeout { after: timeout },
            };

            if !failure.is_retryable() || attempt >= attempts {
                return Err(failure);
            }

            let delay = backoff.next_delay();
            metrics::record_retry();
            warn!(%id, attempt, ?delay, cause = %failure, "lookup failed, retrying");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

/// Concatenate `parts` in order, checking the result against the byte count
/// reported while fetching.
fn assemble(parts: &[Bytes], expected: usize) -> Result<Bytes, RetrievalError> {
    let mut buffer = BytesMut::with_capacity(expected);
    for part in parts {
        buffer.extend_from_slice(part);
    }
    if buffer.len() != expected {
        return Err(RetrievalError::LengthMismatch {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(buffer.freeze())
}
