//! Error types for container script parsing.

/// Error type for push encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// A push declares more bytes than remain in the script.
    #[error("truncated push at offset {offset}: declared {declared} bytes, {available} available")]
    Truncated {
        /// Offset of the push opcode.
        offset: usize,
        /// Number of bytes the header requires (header remainder plus data).
        declared: usize,
        /// Number of bytes remaining after the opcode.
        available: usize,
    },

    /// The byte at `offset` is neither a direct length nor an extended marker.
    #[error("unknown push opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode {
        /// Offset of the opcode.
        offset: usize,
        /// The offending byte.
        opcode: u8,
    },

    /// The script is empty, so it has no marker byte.
    #[error("container script is missing its marker byte")]
    MissingMarker,

    /// The script opens with a byte other than the container marker.
    #[error("unexpected container marker 0x{found:02x}")]
    UnexpectedMarker {
        /// The byte found in marker position.
        found: u8,
    },

    /// The payload does not fit in a 4-byte length prefix.
    #[error("push of {len} bytes exceeds the 4-byte length prefix")]
    PushTooLarge {
        /// Length of the rejected payload.
        len: usize,
    },
}

/// Result type for script operations.
pub type Result<T> = core::result::Result<T, ScriptError>;
