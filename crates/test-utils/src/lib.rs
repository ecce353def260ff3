//! Test utilities for bcat crates.
//!
//! - [`MemoryLedger`] implements both ledger collaborators in memory, with
//!   scripted failures, an optional per-lookup delay and a journal of every
//!   identifier looked up.
//! - [`publish_payload`] splits a payload, publishes each part container and
//!   the reference container, and returns the identifiers.
//! - [`random_payload`] produces deterministic pseudo-random bytes.

mod ledger;
mod payload;
mod publish;

pub use ledger::MemoryLedger;
pub use payload::random_payload;
pub use publish::{PublishError, Published, publish_payload};
