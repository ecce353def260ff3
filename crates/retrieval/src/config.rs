//! Retrieval configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default pause between successive chunk lookups.
pub const DEFAULT_THROTTLE_MS: u64 = 250;

/// Default timeout of a single lookup attempt.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 30_000;

/// Default number of attempts per lookup.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default first retry delay.
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 500;

/// Default retry delay cap.
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 8_000;

/// Retrieval configuration (TOML-serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Pause between successive chunk lookups, in milliseconds.
    pub throttle_ms: u64,

    /// Timeout of a single lookup attempt, in milliseconds.
    pub lookup_timeout_ms: u64,

    /// Attempts per lookup, including the first. Values below 1 act as 1.
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    pub backoff_initial_ms: u64,

    /// Upper bound on retry delays, in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_initial_ms: DEFAULT_BACKOFF_INITIAL_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
        }
    }
}

impl RetrievalConfig {
    /// Pause between successive chunk lookups.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Timeout of a single lookup attempt.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Attempts per lookup, at least one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Configuration without throttle or retries, for tests and local ledgers.
    pub fn immediate() -> Self {
        Self {
            throttle_ms: 0,
            max_attempts: 1,
            ..Self::default()
        }
    }
}
