//! In-memory ledger.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy_primitives::keccak256;
use async_trait::async_trait;
use bcat_ledger::{Broadcaster, LedgerError, LedgerLookup, LedgerResult, RawRecord};
use bcat_primitives::RecordId;
use bcat_script::Script;
use parking_lot::{Mutex, RwLock};

/// A scripted lookup failure.
#[derive(Debug, Clone)]
struct Failure {
    error: LedgerError,
    /// Remaining failing lookups; `None` fails forever.
    remaining: Option<usize>,
}

/// In-memory ledger implementing [`LedgerLookup`] and [`Broadcaster`].
///
/// Identifiers are derived from a publish counter and the container bytes, so
/// publishing the same container twice yields two distinct records.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<RecordId, RawRecord>>,
    failures: Mutex<HashMap<RecordId, Failure>>,
    journal: Mutex<Vec<RecordId>>,
    published: AtomicU64,
    delay: Option<Duration>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `delay` (uses tokio time, so paused clocks apply).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Store `record` under `id`, replacing any previous record.
    pub fn insert(&self, id: RecordId, record: RawRecord) {
        self.records.write().insert(id, record);
    }

    /// Publish a record whose only output carries `container`.
    pub fn publish(&self, container: &Script) -> RecordId {
        let nonce = self.published.fetch_add(1, Ordering::Relaxed);
        let mut preimage = nonce.to_be_bytes().to_vec();
        preimage.extend_from_slice(container.as_bytes());
        let id = RecordId::from(keccak256(&preimage));
        self.insert(id, RawRecord::with_container(container.clone()));
        id
    }

    /// Fail every lookup of `id` with `error`.
    pub fn fail_at(&self, id: RecordId, error: LedgerError) {
        self.failures.lock().insert(id, Failure { error, remaining: None });
    }

    /// Fail the next `times` lookups of `id` with `error`, then answer normally.
    pub fn fail_times(&self, id: RecordId, times: usize, error: LedgerError) {
        self.failures.lock().insert(
            id,
            Failure {
                error,
                remaining: Some(times),
            },
        );
    }

    /// Remove any scripted failure for `id`.
    pub fn heal(&self, id: &RecordId) {
        self.failures.lock().remove(id);
    }

    /// Every identifier looked up so far, in call order.
    pub fn lookups(&self) -> Vec<RecordId> {
        self.journal.lock().clone()
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        self.journal.lock().len()
    }

    /// Forget the lookup journal.
    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn scripted_failure(&self, id: &RecordId) -> Option<LedgerError> {
        let mut failures = self.failures.lock();
        let failure = failures.get_mut(id)?;
        match &mut failure.remaining {
            None => Some(failure.error.clone()),
            Some(0) => {
                failures.remove(id);
                None
            }
            Some(remaining) => {
                *remaining -= 1;
                Some(failure.error.clone())
            }
        }
    }
}

#[async_trait]
impl LedgerLookup for MemoryLedger {
    async fn fetch(&self, id: &RecordId) -> LedgerResult<RawRecord> {
        self.journal.lock().push(*id);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.scripted_failure(id) {
            return Err(error);
        }

        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or(LedgerError::NotFound { id: *id })
    }
}

#[async_trait]
impl Broadcaster for MemoryLedger {
    async fn submit(&self, container: &Script) -> LedgerResult<RecordId> {
        Ok(self.publish(container))
    }
}
