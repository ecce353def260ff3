//! Command-line arguments.

use std::path::PathBuf;

use bcat_primitives::RecordId;
use clap::{Args, Parser, Subcommand};

/// Split, inspect and fetch files stored as BCAT chunked records.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Configuration file. Defaults to `bcat.toml` in the working directory if present.
    #[arg(long, global = true, value_name = "FILE", env = "BCAT_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Logging configuration.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Logging")]
pub(crate) struct LogArgs {
    /// Silence all output except errors.
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Verbose mode (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub(crate) verbosity: u8,

    /// Log filter directive (e.g., "bcat_retrieval=debug").
    #[arg(long = "log.filter", global = true, value_name = "DIRECTIVE")]
    pub(crate) filter: Option<String>,

    /// Use JSON format for log output.
    #[arg(long = "log.json", global = true)]
    pub(crate) json: bool,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Split a file into part containers, one hex script per line.
    Split(SplitArgs),

    /// Build a reference container from part record identifiers.
    Reference(ReferenceArgs),

    /// Decode a hex container script and print its pushes.
    Inspect(InspectArgs),

    /// Resolve a reference record and reconstruct its file.
    Fetch(FetchArgs),
}

/// Arguments for `split`.
#[derive(Debug, Args)]
pub(crate) struct SplitArgs {
    /// File to split.
    pub(crate) file: PathBuf,

    /// Maximum payload bytes per chunk.
    #[arg(long, value_name = "BYTES")]
    pub(crate) max_chunk_bytes: Option<usize>,
}

/// Arguments for `reference`.
#[derive(Debug, Args)]
pub(crate) struct ReferenceArgs {
    /// File name recorded in the reference.
    #[arg(long = "file", value_name = "NAME")]
    pub(crate) filename: String,

    /// Declared MIME type.
    #[arg(long, default_value = "application/octet-stream")]
    pub(crate) mime: String,

    /// Character set of text payloads.
    #[arg(long)]
    pub(crate) charset: Option<String>,

    /// Free-form info string.
    #[arg(long, default_value = "")]
    pub(crate) info: String,

    /// Declare the payload as gzip-compressed.
    #[arg(long)]
    pub(crate) gzip: bool,

    /// Part record identifiers in chunk order.
    #[arg(required = true, value_name = "ID")]
    pub(crate) ids: Vec<RecordId>,
}

/// Arguments for `inspect`.
#[derive(Debug, Args)]
pub(crate) struct InspectArgs {
    /// Container or output script as hex. A leading `00` before the marker is accepted.
    pub(crate) script: String,
}

/// Arguments for `fetch`.
#[derive(Debug, Args)]
pub(crate) struct FetchArgs {
    /// Reference record identifier.
    pub(crate) reference: RecordId,

    /// Output path. Defaults to the recorded file name.
    #[arg(short, long, value_name = "PATH")]
    pub(crate) out: Option<PathBuf>,

    /// Explorer base URL.
    #[arg(long, value_name = "URL")]
    pub(crate) explorer_url: Option<String>,

    /// Pause between chunk lookups in milliseconds.
    #[arg(long, value_name = "MS")]
    pub(crate) throttle_ms: Option<u64>,

    /// Timeout of a single lookup in milliseconds.
    #[arg(long, value_name = "MS")]
    pub(crate) timeout_ms: Option<u64>,

    /// Attempts per lookup, including the first.
    #[arg(long, value_name = "COUNT")]
    pub(crate) max_attempts: Option<u32>,

    /// Try the structured document decode for every text payload.
    #[arg(long)]
    pub(crate) bundle: bool,

    /// Reconstruct even when `viewer.auto_start` is off.
    #[arg(long)]
    pub(crate) start: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let id = "ab".repeat(32);
        let cli = Cli::try_parse_from(["bcat", "-v", "fetch", &id, "--throttle-ms", "10"]).unwrap();
        assert_eq!(cli.logs.verbosity, 1);
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.reference.to_hex(), id);
        assert_eq!(args.throttle_ms, Some(10));
    }

    #[test]
    fn test_reference_requires_ids() {
        assert!(Cli::try_parse_from(["bcat", "reference", "--file", "a.txt"]).is_err());
    }
}
