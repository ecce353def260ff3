//! Collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;
use bcat_primitives::RecordId;
use bcat_script::Script;

use crate::{error::LedgerResult, record::RawRecord};

/// Read access to published records.
///
/// Implementations are shared read-only between concurrent reconstructions.
/// Timeouts are applied by the caller, not by the lookup itself.
#[async_trait]
pub trait LedgerLookup: Send + Sync {
    /// Fetch the record published under `id`.
    async fn fetch(&self, id: &RecordId) -> LedgerResult<RawRecord>;
}

#[async_trait]
impl<T: LedgerLookup + ?Sized> LedgerLookup for Arc<T> {
    async fn fetch(&self, id: &RecordId) -> LedgerResult<RawRecord> {
        (**self).fetch(id).await
    }
}

#[async_trait]
impl<T: LedgerLookup + ?Sized> LedgerLookup for &T {
    async fn fetch(&self, id: &RecordId) -> LedgerResult<RawRecord> {
        (**self).fetch(id).await
    }
}

/// Publishes containers to the ledger.
///
/// Encoders never call this; callers wrap finished containers into full
/// records (value outputs, change, fees) and submit them here.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Publish a record whose data output holds `container`.
    async fn submit(&self, container: &Script) -> LedgerResult<RecordId>;
}

#[async_trait]
impl<T: Broadcaster + ?Sized> Broadcaster for Arc<T> {
    async fn submit(&self, container: &Script) -> LedgerResult<RecordId> {
        (**self).submit(container).await
    }
}
