//! Retrieval metrics.

use metrics::{counter, histogram};

pub(crate) fn record_chunk_fetched(bytes: usize) {
    counter!("bcat_chunks_fetched_total").increment(1);
    histogram!("bcat_chunk_bytes").record(bytes as f64);
}

pub(crate) fn record_chunk_failure() {
    counter!("bcat_chunk_fetch_failures_total").increment(1);
}

pub(crate) fn record_retry() {
    counter!("bcat_lookup_retries_total").increment(1);
}

pub(crate) fn record_reconstructed(bytes: usize) {
    histogram!("bcat_reconstructed_bytes").record(bytes as f64);
}
