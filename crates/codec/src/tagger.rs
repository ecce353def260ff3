//! Namespace tagging.
//!
//! Producers disagree on how the namespace is laid out: most push it as its
//! own element, some leave encoding artifacts around it, some concatenate it
//! with the payload, and a few omit it. [`Tagger::unwrap`] tries each
//! [`MatchStrategy`] in order and stops at the first that locates a payload.

use bcat_primitives::Namespace;
use bcat_script::{Script, decode_pushes};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{EncodeError, TagError};

/// Characters ignored around a namespace decoded as text.
const TEXT_ARTIFACTS: &[char] = &['\u{feff}', '\0', ' ', '\t', '\r', '\n'];

/// Strategies tried by [`Tagger::unwrap`], in order.
pub const DEFAULT_STRATEGIES: [MatchStrategy; 4] = [
    MatchStrategy::ExactBytes,
    MatchStrategy::Utf8Text,
    MatchStrategy::Concatenated,
    MatchStrategy::LargestPush,
];

/// One way of locating the payload of a namespace-tagged container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MatchStrategy {
    /// A push equal to the namespace bytes; the payload is the next push.
    ExactBytes,
    /// A push whose UTF-8 text, stripped of BOM, NUL and whitespace, equals
    /// the namespace; the payload is the next push.
    Utf8Text,
    /// A push that starts with the namespace bytes; the payload is the rest
    /// of that push.
    Concatenated,
    /// No namespace at all; the largest push longer than the namespace is
    /// taken as the payload. Best effort only.
    LargestPush,
}

/// Where a strategy found the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The namespace is at this push index; the payload follows it.
    After(usize),
    /// The payload shares a push with the namespace.
    Inline {
        /// Index of the shared push.
        index: usize,
        /// Bytes following the namespace inside that push.
        payload: Bytes,
    },
    /// The payload is the push at this index, chosen without a namespace.
    Fallback(usize),
}

impl MatchStrategy {
    /// Run this strategy alone against `pushes`.
    pub fn locate(&self, namespace: Namespace, pushes: &[Bytes]) -> Option<Located> {
        match self {
            Self::ExactBytes => pushes
                .iter()
                .position(|push| push.as_ref() == namespace.as_bytes())
                .map(Located::After),
            Self::Utf8Text => pushes
                .iter()
                .position(|push| text_matches(push, namespace))
                .map(Located::After),
            Self::Concatenated => pushes.iter().enumerate().find_map(|(index, push)| {
                (push.len() > namespace.len() && push.starts_with(namespace.as_bytes())).then(
                    || Located::Inline {
                        index,
                        payload: push.slice(namespace.len()..),
                    },
                )
            }),
            Self::LargestPush => pushes
                .iter()
                .enumerate()
                .filter(|(_, push)| push.len() > namespace.len())
                // `max_by_key` keeps the last maximum; reverse so ties go to the first.
                .rev()
                .max_by_key(|(_, push)| push.len())
                .map(|(index, _)| Located::Fallback(index)),
        }
    }
}

fn text_matches(push: &[u8], namespace: Namespace) -> bool {
    let text = String::from_utf8_lossy(push);
    text.trim_matches(TEXT_ARTIFACTS) == namespace.as_str()
}

/// Payload extracted from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    /// The payload bytes.
    pub payload: Bytes,
    /// Strategy that located the payload.
    pub strategy: MatchStrategy,
}

/// Wraps payloads in, and extracts them from, namespace-tagged containers.
#[derive(Debug, Clone)]
pub struct Tagger {
    namespace: Namespace,
    strategies: Vec<MatchStrategy>,
}

impl Tagger {
    /// Tagger for `namespace` using [`DEFAULT_STRATEGIES`].
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            strategies: DEFAULT_STRATEGIES.to_vec(),
        }
    }

    /// Tagger for chunk part containers.
    pub fn part() -> Self {
        Self::new(Namespace::PART)
    }

    /// Replace the ordered strategy list.
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = MatchStrategy>) -> Self {
        self.strategies = strategies.into_iter().collect();
        self
    }

    /// The namespace this tagger matches.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Build `[marker][namespace][payload]`.
    pub fn wrap(&self, payload: &[u8]) -> Result<Script, EncodeError> {
        Ok(Script::builder()
            .push(self.namespace.as_bytes())?
            .push(payload)?
            .build())
    }

    /// Locate the payload among already-decoded pushes.
    pub fn unwrap(&self, pushes: &[Bytes]) -> Result<Unwrapped, TagError> {
        for &strategy in &self.strategies {
            let Some(located) = strategy.locate(self.namespace, pushes) else {
                continue;
            };
            let payload = match located {
                Located::After(index) => pushes
                    .get(index + 1)
                    .cloned()
                    .ok_or(TagError::NoPayloadAfterNamespace { index })?,
                Located::Inline { payload, .. } => payload,
                Located::Fallback(index) => {
                    warn!(
                        namespace = %self.namespace,
                        index,
                        "namespace not found, using largest push as payload"
                    );
                    pushes.get(index).cloned().ok_or(TagError::NamespaceNotFound {
                        namespace: self.namespace,
                    })?
                }
            };
            debug!(%strategy, len = payload.len(), "unwrapped container payload");
            return Ok(Unwrapped { payload, strategy });
        }
        Err(TagError::NamespaceNotFound {
            namespace: self.namespace,
        })
    }

    /// Decode `script` and locate its payload.
    pub fn unwrap_script(&self, script: &[u8]) -> Result<Unwrapped, TagError> {
        let pushes = decode_pushes(script)?;
        self.unwrap(&pushes)
    }
}
