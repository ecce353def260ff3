//! `bcat reference`.

use bcat_codec::{Compression, ReferenceRecord, encode_reference};
use eyre::Result;

use crate::cli::ReferenceArgs;

/// Print the reference container for the given chunk identifiers.
pub(crate) fn run(args: ReferenceArgs) -> Result<()> {
    let mut record = ReferenceRecord::new(args.filename, args.mime, args.ids).with_info(args.info);
    if let Some(charset) = args.charset {
        record = record.with_charset(charset);
    }
    if args.gzip {
        record = record.with_compression(Compression::Gzip);
    }

    println!("{}", encode_reference(&record)?.to_hex());
    Ok(())
}
