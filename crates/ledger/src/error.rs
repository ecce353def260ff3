//! Error types for ledger collaborators.

use bcat_primitives::RecordId;

/// Error returned by a ledger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No record exists under the identifier.
    #[error("record not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: RecordId,
    },

    /// The backend could not be reached or answered with a failure.
    #[error("ledger transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The backend answered with data that cannot be normalized.
    #[error("malformed ledger response: {reason}")]
    Malformed {
        /// Why the response was rejected.
        reason: String,
    },
}

impl LedgerError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Only transport failures are transient; a missing or malformed record
    /// stays that way on an append-only ledger.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = core::result::Result<T, LedgerError>;
