//! Protocol namespaces.
//!
//! A namespace is a fixed ASCII string pushed as its own element at the start
//! of a container. It tells readers which record type follows. The values are
//! wire format and must match byte-for-byte across implementations.

use std::fmt;

/// Fixed tag identifying the record type held by a container.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(&'static str);

impl Namespace {
    /// Namespace of a reference record (the ordered list of part identifiers).
    pub const REFERENCE: Self = Self("15DHFxWZJT58f9nhyGnsRBqrgwK4W6h4Up");

    /// Namespace of a part record (one chunk of payload).
    pub const PART: Self = Self("1ChDHzdd1H4wSjgGMHyndZm6qxEDGjqpJL");

    /// The namespace as a string.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// The namespace as raw UTF-8 bytes, exactly as pushed.
    pub const fn as_bytes(&self) -> &'static [u8] {
        self.0.as_bytes()
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the namespace is empty.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Namespace {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}
