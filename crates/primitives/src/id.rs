//! Ledger record identifiers.

use std::{fmt, str::FromStr};

use alloy_primitives::B256;

/// Error returned when parsing or decoding a [`RecordId`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordIdError {
    /// Input did not have exactly 32 bytes.
    #[error("invalid record id length: expected {expected}, got {got}")]
    Length {
        /// Required length in bytes.
        expected: usize,
        /// Observed length in bytes.
        got: usize,
    },

    /// Input was not valid hex.
    #[error("invalid record id hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Identifier of a record on the ledger.
///
/// The inner bytes are kept in *display order*: the order in which block
/// explorers print the identifier as hex. Reference records store each
/// identifier byte-reversed, so crossing that boundary must go through
/// [`to_wire`](Self::to_wire) and [`from_wire`](Self::from_wire).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(B256);

impl RecordId {
    /// Length of an identifier in bytes.
    pub const LEN: usize = 32;

    /// Create an identifier from display-order bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Display-order bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0.0
    }

    /// Bytes in the reversed order used inside reference records.
    pub fn to_wire(&self) -> [u8; 32] {
        let mut wire = self.0.0;
        wire.reverse();
        wire
    }

    /// Decode an identifier stored in wire (reversed) order.
    pub fn from_wire(wire: &[u8]) -> Result<Self, RecordIdError> {
        let mut bytes: [u8; 32] = wire.try_into().map_err(|_| RecordIdError::Length {
            expected: Self::LEN,
            got: wire.len(),
        })?;
        bytes.reverse();
        Ok(Self::new(bytes))
    }

    /// Lowercase hex in display order, without a `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl From<[u8; 32]> for RecordId {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl From<B256> for RecordId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != Self::LEN * 2 {
            return Err(RecordIdError::Length {
                expected: Self::LEN,
                got: s.len() / 2,
            });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::new(bytes))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DISPLAY: &str = "0b1c2d3e4f5061728394a5b6c7d8e9fa0b1c2d3e4f5061728394a5b6c7d8e9ff";

    #[test]
    fn test_parse_and_display() {
        let id: RecordId = DISPLAY.parse().unwrap();
        assert_eq!(id.to_string(), DISPLAY);
        assert_eq!(id.as_bytes()[0], 0x0b);
        assert_eq!(id.as_bytes()[31], 0xff);
    }

    #[test]
    fn test_parse_accepts_prefix() {
        let id: RecordId = format!("0x{DISPLAY}").parse().unwrap();
        assert_eq!(id.to_string(), DISPLAY);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        let err = "abcd".parse::<RecordId>().unwrap_err();
        assert_eq!(err, RecordIdError::Length { expected: 32, got: 2 });
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(bad.parse::<RecordId>(), Err(RecordIdError::Hex(_))));
    }

    #[test]
    fn test_wire_order_is_reversed() {
        let id: RecordId = DISPLAY.parse().unwrap();
        let wire = id.to_wire();
        assert_eq!(wire[0], 0xff);
        assert_eq!(wire[31], 0x0b);
        assert_eq!(RecordId::from_wire(&wire).unwrap(), id);
    }

    #[test]
    fn test_from_wire_rejects_short_input() {
        let err = RecordId::from_wire(&[0u8; 31]).unwrap_err();
        assert_eq!(err, RecordIdError::Length { expected: 32, got: 31 });
    }

    #[test]
    fn test_serde_uses_display_hex() {
        let id: RecordId = DISPLAY.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{DISPLAY}\""));
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn test_wire_flip_is_an_involution(bytes in any::<[u8; 32]>()) {
            let id = RecordId::new(bytes);
            prop_assert_eq!(RecordId::from_wire(&id.to_wire()).unwrap(), id);
            prop_assert_eq!(id.to_hex().parse::<RecordId>().unwrap(), id);
        }
    }
}
