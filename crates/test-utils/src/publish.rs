//! Publishing helpers.

use bcat_codec::{ChunkEncoder, EncodeError, EncoderConfig, ReferenceRecord, encode_reference};
use bcat_ledger::{Broadcaster, LedgerError};
use bcat_primitives::RecordId;
use bytes::Bytes;

/// Errors raised by [`publish_payload`].
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A container could not be built.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The broadcaster rejected a container.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Identifiers produced by [`publish_payload`].
#[derive(Debug, Clone)]
pub struct Published {
    /// Identifier of the reference record.
    pub reference_id: RecordId,
    /// The reference record as encoded.
    pub reference: ReferenceRecord,
}

impl Published {
    /// Part record identifiers in chunk order.
    pub fn chunk_ids(&self) -> &[RecordId] {
        &self.reference.chunk_ids
    }
}

/// Split `payload`, publish every part container, then publish the reference.
pub async fn publish_payload<B: Broadcaster>(
    broadcaster: &B,
    payload: impl Into<Bytes>,
    filename: &str,
    mime_type: &str,
    max_chunk_bytes: usize,
) -> Result<Published, PublishError> {
    let encoder = ChunkEncoder::new(EncoderConfig { max_chunk_bytes })?;

    let mut chunk_ids = Vec::new();
    for container in encoder.encode(payload)? {
        chunk_ids.push(broadcaster.submit(&container).await?);
    }

    let reference = ReferenceRecord::new(filename, mime_type, chunk_ids);
    let reference_id = broadcaster.submit(&encode_reference(&reference)?).await?;

    Ok(Published {
        reference_id,
        reference,
    })
}
