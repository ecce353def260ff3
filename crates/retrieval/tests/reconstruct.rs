//! End-to-end reconstruction against an in-memory ledger.

use assert_matches::assert_matches;
use bcat_codec::{LegacyMetadata, Namespace, ReferenceFormat, ReferenceRecord, TagError, Tagger};
use bcat_ledger::{LedgerError, RawOutput, RawRecord};
use bcat_primitives::RecordId;
use bcat_retrieval::{
    CancellationToken, FetchFailure, Progress, RetrievalConfig, RetrievalError, Retriever,
};
use bcat_script::{OP_RETURN, Script, ScriptError};
use bcat_test_utils::{MemoryLedger, publish_payload, random_payload};
use proptest::prelude::*;

const MIME: &str = "application/octet-stream";

fn retriever(ledger: &MemoryLedger) -> Retriever<&MemoryLedger> {
    Retriever::new(ledger, RetrievalConfig::immediate())
}

#[tokio::test(start_paused = true)]
async fn test_concrete_two_chunk_scenario() {
    let ledger = MemoryLedger::new();
    let payload = random_payload(130_000, 42);
    let published = publish_payload(&ledger, payload.clone(), "data.bin", MIME, 65_000)
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let retriever = retriever(&ledger);
    let decoded = retriever.resolve(&published.reference_id, &cancel).await.unwrap();
    assert_eq!(decoded.format, ReferenceFormat::Standard);
    assert_eq!(decoded.record.chunk_count(), 2);

    let mut sizes = Vec::new();
    let result = retriever
        .reconstruct(&decoded.record, |p: &Progress<'_>| sizes.push(p.chunk.len()), &cancel)
        .await
        .unwrap();

    assert_eq!(sizes, vec![65_000, 65_000]);
    assert_eq!(result.bytes.as_ref(), payload.as_slice());
    assert_eq!(result.mime_type, MIME);
    assert_eq!(result.filename, "data.bin");
}

#[tokio::test(start_paused = true)]
async fn test_progress_reported_in_order() {
    let ledger = MemoryLedger::new();
    let payload = random_payload(1_000, 7);
    let published = publish_payload(&ledger, payload, "p.bin", MIME, 300).await.unwrap();

    let mut reports = Vec::new();
    retriever(&ledger)
        .reconstruct(
            &published.reference,
            |p| reports.push((p.index, p.completed, p.total, p.received_bytes)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        reports,
        vec![(0, 1, 4, 300), (1, 2, 4, 600), (2, 3, 4, 900), (3, 4, 4, 1_000)]
    );
    assert_eq!(ledger.lookups(), published.chunk_ids());
}

#[tokio::test(start_paused = true)]
async fn test_shuffled_identifiers_change_output() {
    let ledger = MemoryLedger::new();
    let payload = random_payload(500, 11);
    let published = publish_payload(&ledger, payload.clone(), "s.bin", MIME, 100).await.unwrap();

    let mut shuffled = published.reference.clone();
    shuffled.chunk_ids.reverse();

    let result = retriever(&ledger)
        .reconstruct(&shuffled, |_| {}, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), payload.len());
    assert_ne!(result.bytes.as_ref(), payload.as_slice());
    assert_eq!(&result.bytes[..100], &payload[400..]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_at_index_two_aborts() {
    let ledger = MemoryLedger::new();
    let published = publish_payload(&ledger, random_payload(50, 3), "f.bin", MIME, 10)
        .await
        .unwrap();
    let ids = published.chunk_ids().to_vec();
    assert_eq!(ids.len(), 5);
    ledger.fail_at(ids[2], LedgerError::NotFound { id: ids[2] });

    let mut completed = 0;
    let err = retriever(&ledger)
        .reconstruct(&published.reference, |p| completed = p.completed, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RetrievalError::ChunkFetchFailed { index: 2, cause: FetchFailure::Lookup(LedgerError::NotFound { .. }) }
    );
    assert_eq!(completed, 2);
    assert_eq!(ledger.lookups(), ids[..3].to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_resume_single_chunk_after_failure() {
    let ledger = MemoryLedger::new();
    let payload = random_payload(30, 5);
    let published = publish_payload(&ledger, payload.clone(), "r.bin", MIME, 10).await.unwrap();
    let ids = published.chunk_ids().to_vec();
    ledger.fail_at(ids[1], LedgerError::transport("connection reset"));

    let cancel = CancellationToken::new();
    let retriever = retriever(&ledger);
    let err = retriever
        .reconstruct(&published.reference, |_| {}, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.chunk_index(), Some(1));

    ledger.heal(&ids[1]);
    let chunk = retriever.fetch_chunk(&published.reference, 1, &cancel).await.unwrap();
    assert_eq!(chunk.as_ref(), &payload[10..20]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_payload_round_trip() {
    let ledger = MemoryLedger::new();
    let published = publish_payload(&ledger, Vec::new(), "empty", "text/plain", 10).await.unwrap();
    assert_eq!(published.chunk_ids().len(), 1);

    let (_, result) = retriever(&ledger)
        .fetch_file(&published.reference_id, |_| {}, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_op_false_prefixed_outputs() {
    let ledger = MemoryLedger::new();
    let part = Tagger::part().wrap(b"payload").unwrap();
    let mut script = vec![0x00];
    script.extend_from_slice(part.as_bytes());

    let id = RecordId::new([0xaa; 32]);
    ledger.insert(
        id,
        RawRecord::new(vec![RawOutput::new(1_000, vec![0x76, 0xa9]), RawOutput::new(0, script)]),
    );

    let record = ReferenceRecord::new("x.txt", "text/plain", vec![id]);
    let result = retriever(&ledger)
        .reconstruct(&record, |_| {}, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.bytes.as_ref(), b"payload");
}

#[tokio::test(start_paused = true)]
async fn test_legacy_reference_is_undiscoverable() {
    let ledger = MemoryLedger::new();
    let metadata = LegacyMetadata {
        filename: Some("old.png".into()),
        mime_type: Some("image/png".into()),
        chunk_count: Some(3),
        ..Default::default()
    };
    let container = Script::builder()
        .push(metadata.to_json().unwrap())
        .unwrap()
        .build();
    let id = ledger.publish(&container);

    let err = retriever(&ledger)
        .fetch_file(&id, |_| {}, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_matches!(err, RetrievalError::ChunksUndiscoverable);

    let decoded = retriever(&ledger).resolve(&id, &CancellationToken::new()).await.unwrap();
    assert_eq!(decoded.record.filename, "old.png");
    assert_matches!(decoded.format, ReferenceFormat::Legacy(_));
}

#[tokio::test(start_paused = true)]
async fn test_missing_reference() {
    let ledger = MemoryLedger::new();
    let id = RecordId::new([1; 32]);
    let err = retriever(&ledger)
        .resolve(&id, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        RetrievalError::ReferenceLookup { id: missing, cause: FetchFailure::Lookup(LedgerError::NotFound { .. }) }
            if missing == id
    );
}

/// Reference record over `[ok, bad, ok]`, where `bad` is stored under its own id.
fn record_with_bad_middle(ledger: &MemoryLedger, bad: Vec<u8>) -> ReferenceRecord {
    let first = ledger.publish(&Tagger::part().wrap(b"first").unwrap());
    let middle = RecordId::new([0x33; 32]);
    ledger.insert(middle, RawRecord::with_container(bad));
    let last = ledger.publish(&Tagger::part().wrap(b"last").unwrap());
    ReferenceRecord::new("bad.bin", MIME, vec![first, middle, last])
}

#[tokio::test(start_paused = true)]
async fn test_namespace_without_payload_aborts_without_retry() {
    let ledger = MemoryLedger::new();
    let namespace_only = Script::builder()
        .push(Namespace::PART.as_bytes())
        .unwrap()
        .build();
    let record = record_with_bad_middle(&ledger, namespace_only.as_bytes().to_vec());

    let err = Retriever::new(&ledger, RetrievalConfig::default())
        .reconstruct(&record, |_| {}, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RetrievalError::ChunkFetchFailed {
            index: 1,
            cause: FetchFailure::Unwrap(TagError::NoPayloadAfterNamespace { index: 0 })
        }
    );
    assert_eq!(ledger.lookup_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_truncated_part_aborts_without_retry() {
    let ledger = MemoryLedger::new();
    let mut truncated = vec![OP_RETURN, Namespace::PART.len() as u8];
    truncated.extend_from_slice(Namespace::PART.as_bytes());
    truncated.extend_from_slice(&[0x05, b'a', b'b']);
    let record = record_with_bad_middle(&ledger, truncated);

    let err = Retriever::new(&ledger, RetrievalConfig::default())
        .reconstruct(&record, |_| {}, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RetrievalError::ChunkFetchFailed {
            index: 1,
            cause: FetchFailure::Unwrap(TagError::Script(ScriptError::Truncated { .. }))
        }
    );
    assert_eq!(ledger.lookups(), record.chunk_ids[..2].to_vec());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn proptest_round_trip(
        payload in proptest::collection::vec(any::<u8>(), 0..2_048),
        chunk_size in 1usize..600,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let result = runtime.block_on(async {
            let ledger = MemoryLedger::new();
            let published = publish_payload(&ledger, payload.clone(), "p", MIME, chunk_size)
                .await
                .unwrap();
            retriever(&ledger)
                .fetch_file(&published.reference_id, |_| {}, &CancellationToken::new())
                .await
                .unwrap()
                .1
        });
        prop_assert_eq!(result.bytes.as_ref(), payload.as_slice());
    }
}
