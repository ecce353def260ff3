//! `bcat fetch`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bcat_codec::{ReferenceFormat, ReferenceRecord};
use bcat_content::{Classified, ContentView, EmbeddedDocument, classify_record};
use bcat_ledger::HttpLedger;
use bcat_primitives::RecordId;
use bcat_retrieval::{CancellationToken, Retriever};
use eyre::{Result, WrapErr};
use tracing::{info, warn};

use crate::{cli::FetchArgs, config::BcatConfig};

/// Resolve the reference, reconstruct the file and write it out.
pub(crate) async fn run(args: &FetchArgs, config: &BcatConfig) -> Result<()> {
    let ledger = HttpLedger::new(&config.ledger)?;
    let retriever = Retriever::new(ledger, config.retrieval.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let decoded = retriever
        .resolve(&args.reference, &cancel)
        .await
        .wrap_err_with(|| format!("failed to resolve reference {}", args.reference))?;
    let record = &decoded.record;

    if let ReferenceFormat::Legacy(meta) = &decoded.format {
        warn!(
            declared_chunks = ?meta.chunk_count,
            "reference uses legacy metadata; chunks cannot be located"
        );
    }
    print_record(&args.reference, record);

    if !config.viewer.auto_start {
        info!("auto start disabled; pass --start to reconstruct");
        return Ok(());
    }

    let payload = retriever
        .reconstruct(
            record,
            |progress| {
                info!(
                    chunk = progress.completed,
                    total = progress.total,
                    bytes = progress.received_bytes,
                    "fetched chunk"
                );
            },
            &cancel,
        )
        .await
        .wrap_err("reconstruction failed")?;

    let classified = classify_record(payload.bytes, record, &config.classify);
    if let Some(notice) = &classified.notice {
        info!(kind = %classified.kind, "{}", notice.summary());
    }

    let out = output_path(args.out.as_deref(), &args.reference, record, &classified);
    write_output(&out, &classified)?;
    println!("wrote {} ({})", out.display(), classified.kind);
    Ok(())
}

fn print_record(id: &RecordId, record: &ReferenceRecord) {
    println!("reference:   {id}");
    println!("filename:    {}", record.filename);
    println!("mime:        {}", record.mime_type);
    println!("compression: {}", record.compression);
    println!("chunks:      {}", record.chunk_count());
}

/// Explicit path, else the recorded file name, else the reference id with an
/// extension suggested by the MIME type.
fn output_path(
    explicit: Option<&Path>,
    id: &RecordId,
    record: &ReferenceRecord,
    classified: &Classified,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    // Only the final component of a recorded name is trusted.
    if let Some(name) = Path::new(&record.filename).file_name() {
        return PathBuf::from(name);
    }

    let extension = match &classified.view {
        ContentView::Display(handle) => handle.extension().unwrap_or("bin"),
        ContentView::Text(_) => "txt",
        ContentView::Document(_) => "json",
        ContentView::Binary(_) => "bin",
    };
    PathBuf::from(format!("{id}.{extension}"))
}

fn write_output(path: &Path, classified: &Classified) -> Result<()> {
    let write = |path: &Path, bytes: &[u8]| {
        fs::write(path, bytes).wrap_err_with(|| format!("failed to write {}", path.display()))
    };

    match &classified.view {
        ContentView::Display(handle) => write(path, handle.bytes()),
        ContentView::Text(text) => write(path, text.as_bytes()),
        ContentView::Binary(bytes) => write(path, bytes),
        ContentView::Document(document) => write_document(path, document, write),
    }
}

/// Metadata as pretty JSON at `path`, each image next to it as `<stem>.<label>`.
fn write_document<W>(path: &Path, document: &EmbeddedDocument, write: W) -> Result<()>
where
    W: Fn(&Path, &[u8]) -> Result<()>,
{
    write(path, &serde_json::to_vec_pretty(&document.metadata)?)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    for (label, image) in &document.images {
        let Some(label) = Path::new(label).file_name() else {
            warn!(%label, "skipping image with unusable label");
            continue;
        };
        let image_path = path.with_file_name(format!("{stem}.{}", label.to_string_lossy()));
        write(&image_path, image)?;
    }
    Ok(())
}
