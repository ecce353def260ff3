//! HTTP block-explorer lookup.
//!
//! Speaks the common explorer shape `GET {base}/tx/hash/{id}` returning
//! `{"vout": [{"value": <coins>, "scriptPubKey": {"hex": "..."}}]}`.

use async_trait::async_trait;
use bcat_primitives::RecordId;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{LedgerError, LedgerResult},
    record::{RawOutput, RawRecord},
    traits::LedgerLookup,
};

/// Default explorer endpoint.
pub const DEFAULT_EXPLORER_URL: &str = "https://api.whatsonchain.com/v1/bsv/main/";

/// Base units per coin in explorer `value` fields.
const UNITS_PER_COIN: f64 = 100_000_000.0;

/// Ledger backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Explorer base URL. Must end with `/` for relative joins.
    pub explorer_url: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

/// [`LedgerLookup`] backed by an HTTP block explorer.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpLedger {
    /// Create a client for the configured explorer.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let mut base = config.explorer_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| LedgerError::malformed(format!("invalid explorer URL: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, id: &RecordId) -> LedgerResult<Url> {
        self.base_url
            .join(&format!("tx/hash/{id}"))
            .map_err(|e| LedgerError::malformed(format!("failed to build lookup URL: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    vout: Vec<VoutEntry>,
}

#[derive(Debug, Deserialize)]
struct VoutEntry {
    #[serde(default)]
    value: f64,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: ScriptPubKey,
}

#[derive(Debug, Deserialize)]
struct ScriptPubKey {
    hex: String,
}

impl TryFrom<TxResponse> for RawRecord {
    type Error = LedgerError;

    fn try_from(response: TxResponse) -> LedgerResult<Self> {
        let outputs = response
            .vout
            .into_iter()
            .map(|entry| {
                let value = (entry.value * UNITS_PER_COIN).round().max(0.0) as u64;
                RawOutput::from_hex(value, &entry.script_pub_key.hex)
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok(RawRecord::new(outputs))
    }
}

#[async_trait]
impl LedgerLookup for HttpLedger {
    async fn fetch(&self, id: &RecordId) -> LedgerResult<RawRecord> {
        let url = self.url(id)?;
        debug!(%id, %url, "fetching record");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LedgerError::transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound { id: *id });
        }
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::transport(e.to_string()))?;
        if !status.is_success() {
            return Err(LedgerError::transport(format!("explorer error ({status}): {body}")));
        }

        let parsed: TxResponse = serde_json::from_str(&body)
            .map_err(|e| LedgerError::malformed(format!("unexpected explorer response: {e}")))?;
        RawRecord::try_from(parsed)
    }
}
