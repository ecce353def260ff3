//! Error types for the container codec.

use bcat_primitives::Namespace;
use bcat_script::ScriptError;

/// Errors raised while producing containers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Chunk size must be at least one byte.
    #[error("maximum chunk size must be at least 1 byte")]
    InvalidChunkSize,

    /// A reference record needs at least one chunk identifier.
    #[error("reference record has no chunk identifiers")]
    EmptyChunkList,

    /// A push could not be encoded.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Errors raised while locating a namespace-tagged payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// No push matched the namespace and no fallback applied.
    #[error("namespace {namespace} not found in container")]
    NamespaceNotFound {
        /// The namespace that was searched for.
        namespace: Namespace,
    },

    /// The namespace was the last push of the container.
    #[error("namespace at push {index} is not followed by a payload")]
    NoPayloadAfterNamespace {
        /// Index of the namespace push.
        index: usize,
    },

    /// The container itself is malformed.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Errors raised while decoding a reference container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// The container itself is malformed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Neither the reference namespace nor legacy JSON metadata was found.
    #[error("reference namespace not found and no legacy metadata present")]
    NamespaceNotFound,

    /// A metadata push is missing after the namespace.
    #[error("reference record is missing its {field} field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A chunk identifier push does not hold 32 bytes.
    #[error("chunk identifier {index} has {len} bytes, expected 32")]
    InvalidIdentifier {
        /// Position of the identifier in the chunk list.
        index: usize,
        /// Observed length in bytes.
        len: usize,
    },

    /// A text field is not valid UTF-8.
    #[error("reference field {field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Name of the offending field.
        field: &'static str,
    },
}
