//! Core primitive types shared by the BCAT crates.
//!
//! # Types
//!
//! - [`RecordId`] - 32-byte ledger record identifier. Stored in display order;
//!   [`RecordId::to_wire`] and [`RecordId::from_wire`] perform the byte-order
//!   flip used inside reference records.
//! - [`Namespace`] - Fixed ASCII tag identifying a container as a chunk part
//!   ([`Namespace::PART`]) or a reference record ([`Namespace::REFERENCE`]).

mod id;
pub use id::{RecordId, RecordIdError};

mod namespace;
pub use namespace::Namespace;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_exported() {
        let _id: RecordId = RecordId::default();
    }

    #[test]
    fn test_namespaces_are_distinct() {
        assert_ne!(Namespace::PART, Namespace::REFERENCE);
    }
}
