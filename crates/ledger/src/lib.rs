//! Ledger collaborators.
//!
//! The codec never talks to a ledger directly. Reading goes through
//! [`LedgerLookup`], publishing through [`Broadcaster`]. Whatever shape a
//! backend returns is normalized at this boundary into [`RawRecord`] so that
//! loose explorer formats never reach the decoder.

mod error;
mod record;
mod traits;

#[cfg(feature = "http")]
mod http;

pub use error::{LedgerError, LedgerResult};
pub use record::{RawOutput, RawRecord};
pub use traits::{Broadcaster, LedgerLookup};

#[cfg(feature = "http")]
pub use http::{DEFAULT_EXPLORER_URL, HttpLedger, LedgerConfig};
