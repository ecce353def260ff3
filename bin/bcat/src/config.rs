//! Configuration file handling.

use std::{fs, path::Path};

use bcat_codec::EncoderConfig;
use bcat_content::{ClassifyOptions, ViewerConfig};
use bcat_ledger::LedgerConfig;
use bcat_retrieval::RetrievalConfig;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::cli::{FetchArgs, SplitArgs};

/// Configuration file looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "bcat.toml";

/// Configuration for the `bcat` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BcatConfig {
    /// Chunk encoder settings.
    pub(crate) encoder: EncoderConfig,
    /// Retrieval pacing, timeouts and retries.
    pub(crate) retrieval: RetrievalConfig,
    /// Viewer behavior.
    pub(crate) viewer: ViewerConfig,
    /// Classifier options.
    pub(crate) classify: ClassifyOptions,
    /// Ledger backend.
    pub(crate) ledger: LedgerConfig,
}

impl BcatConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, or use defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };

        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Apply `split` overrides.
    pub(crate) fn apply_split_args(&mut self, args: &SplitArgs) {
        if let Some(max) = args.max_chunk_bytes {
            self.encoder.max_chunk_bytes = max;
        }
    }

    /// Apply `fetch` overrides.
    pub(crate) fn apply_fetch_args(&mut self, args: &FetchArgs) {
        if let Some(url) = &args.explorer_url {
            self.ledger.explorer_url = url.clone();
        }
        if let Some(throttle) = args.throttle_ms {
            self.retrieval.throttle_ms = throttle;
        }
        if let Some(timeout) = args.timeout_ms {
            self.retrieval.lookup_timeout_ms = timeout;
        }
        if let Some(attempts) = args.max_attempts {
            self.retrieval.max_attempts = attempts;
        }
        if args.bundle {
            self.classify.attempt_bundle_decode = true;
        }
        if args.start {
            self.viewer.auto_start = true;
        }
    }
}
