//! `bcat inspect`.

use bcat_codec::{ReferenceFormat, Tagger, decode_reference};
use bcat_ledger::RawOutput;
use bcat_script::Pushes;
use eyre::{Result, WrapErr, eyre};

use crate::cli::InspectArgs;

/// Bytes of each push shown before eliding.
const PREVIEW_BYTES: usize = 32;

/// Dump the pushes of a script and anything decodable from them.
pub(crate) fn run(args: &InspectArgs) -> Result<()> {
    let hex = args.script.trim();
    let output = RawOutput::from_hex(0, hex.strip_prefix("0x").unwrap_or(hex))
        .wrap_err("script is not valid hex")?;
    let script = output
        .container()
        .ok_or_else(|| eyre!("script does not start with a container marker"))?;

    println!("container: {} bytes", script.len());
    for (index, push) in Pushes::new(&script)?.enumerate() {
        match push {
            Ok(data) => println!("  [{index}] {}", describe(data)),
            Err(e) => {
                println!("  [{index}] error: {e}");
                break;
            }
        }
    }

    match decode_reference(&script) {
        Ok(decoded) => {
            let record = &decoded.record;
            let format = match decoded.format {
                ReferenceFormat::Standard => "standard",
                ReferenceFormat::Legacy(_) => "legacy",
            };
            println!("reference ({format}):");
            println!("  filename:    {}", record.filename);
            println!("  mime:        {}", record.mime_type);
            println!("  charset:     {}", record.charset.as_deref().unwrap_or("-"));
            println!("  compression: {}", record.compression);
            println!("  info:        {}", record.info);
            println!("  chunks:      {}", record.chunk_count());
            for (index, id) in record.chunk_ids.iter().enumerate() {
                println!("    [{index}] {id}");
            }
        }
        Err(e) => {
            if let Ok(part) = Tagger::part().unwrap_script(&script) {
                println!("part ({}): {} payload bytes", part.strategy, part.payload.len());
            } else {
                println!("not a reference or part container: {e}");
            }
        }
    }
    Ok(())
}

fn describe(data: &[u8]) -> String {
    let shown = data.get(..PREVIEW_BYTES).unwrap_or(data);
    let ellipsis = if shown.len() < data.len() { "..." } else { "" };
    match std::str::from_utf8(data) {
        Ok(text) if !text.is_empty() && text.chars().all(|c| !c.is_control()) => {
            format!("{} bytes {:?}", data.len(), text)
        }
        _ => format!("{} bytes {}{ellipsis}", data.len(), hex::encode(shown)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(b"text/plain"), "10 bytes \"text/plain\"");
        assert_eq!(describe(&[0x00]), "1 bytes 00");
        assert_eq!(describe(&[0xff; 40]), format!("40 bytes {}...", "ff".repeat(32)));
    }
}
