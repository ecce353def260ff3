//! `bcat split`.

use std::fs;

use bcat_codec::ChunkEncoder;
use eyre::{Result, WrapErr};
use tracing::info;

use crate::{cli::SplitArgs, config::BcatConfig};

/// Print one part container per line, in chunk order.
pub(crate) fn run(args: &SplitArgs, config: &BcatConfig) -> Result<()> {
    let payload = fs::read(&args.file)
        .wrap_err_with(|| format!("failed to read {}", args.file.display()))?;

    let encoder = ChunkEncoder::new(config.encoder.clone())?;
    let containers = encoder.encode(payload)?;
    info!(
        file = %args.file.display(),
        chunks = containers.len(),
        max_chunk_bytes = config.encoder.max_chunk_bytes,
        "split file"
    );

    for container in &containers {
        println!("{}", container.to_hex());
    }
    Ok(())
}
