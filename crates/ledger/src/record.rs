//! Normalized ledger records.

use bcat_script::{OP_FALSE, OP_RETURN};
use bytes::Bytes;

use crate::error::{LedgerError, LedgerResult};

/// One output of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// Transferred value in the ledger's base unit.
    pub value: u64,
    /// Locking script bytes.
    pub script: Bytes,
}

impl RawOutput {
    /// Output with raw script bytes.
    pub fn new(value: u64, script: impl Into<Bytes>) -> Self {
        Self {
            value,
            script: script.into(),
        }
    }

    /// Output with a hex-encoded script.
    pub fn from_hex(value: u64, script_hex: &str) -> LedgerResult<Self> {
        let script = hex::decode(script_hex.trim())
            .map_err(|e| LedgerError::malformed(format!("invalid script hex: {e}")))?;
        Ok(Self::new(value, script))
    }

    /// Data-only output carrying a container.
    pub fn data(container: impl Into<Bytes>) -> Self {
        Self::new(0, container)
    }

    /// Offset of the container marker if this is a data-only output.
    ///
    /// Data-only outputs carry no value and start with `OP_RETURN` or
    /// `OP_FALSE OP_RETURN`.
    fn container_offset(&self) -> Option<usize> {
        if self.value != 0 {
            return None;
        }
        match self.script.as_ref() {
            [OP_RETURN, ..] => Some(0),
            [OP_FALSE, OP_RETURN, ..] => Some(1),
            _ => None,
        }
    }

    /// Whether this output carries no value and holds data only.
    pub fn is_data_carrier(&self) -> bool {
        self.container_offset().is_some()
    }

    /// The container script, starting at its marker byte.
    pub fn container(&self) -> Option<Bytes> {
        self.container_offset().map(|offset| self.script.slice(offset..))
    }
}

/// A ledger record reduced to what the decoder needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Outputs in ledger order.
    pub outputs: Vec<RawOutput>,
}

impl RawRecord {
    /// Record with the given outputs.
    pub fn new(outputs: Vec<RawOutput>) -> Self {
        Self { outputs }
    }

    /// Record holding a single data output.
    pub fn with_container(container: impl Into<Bytes>) -> Self {
        Self::new(vec![RawOutput::data(container)])
    }

    /// The first data-only output.
    pub fn first_data_output(&self) -> Option<&RawOutput> {
        self.outputs.iter().find(|output| output.is_data_carrier())
    }

    /// Container of the first data-only output.
    ///
    /// Later data outputs are ignored.
    pub fn container(&self) -> Option<Bytes> {
        self.first_data_output().and_then(RawOutput::container)
    }
}
