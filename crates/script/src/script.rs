//! Whole-container encoding and decoding.

use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::{
    CONTAINER_MARKER,
    error::{Result, ScriptError},
    push::{PushWidth, decode_next_push, write_push},
};

/// Iterator over the pushes of a container script.
///
/// Skips exactly one marker byte, then yields one push per step. Iteration
/// stops after the first error.
#[derive(Debug, Clone)]
pub struct Pushes<'a> {
    script: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Pushes<'a> {
    /// Iterate the pushes of `script`, skipping its marker byte.
    pub fn new(script: &'a [u8]) -> Result<Self> {
        if script.is_empty() {
            return Err(ScriptError::MissingMarker);
        }
        Ok(Self {
            script,
            offset: 1,
            failed: false,
        })
    }

    /// Offset of the next push.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Pushes<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.script.len() {
            return None;
        }
        match decode_next_push(self.script, self.offset) {
            Ok((data, next)) => {
                trace!(offset = self.offset, len = data.len(), "decoded push");
                self.offset = next;
                Some(Ok(data))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every push of a container script into owned buffers.
///
/// The first byte is treated as the marker and skipped without inspection.
pub fn decode_pushes(script: &[u8]) -> Result<Vec<Bytes>> {
    Pushes::new(script)?
        .map(|push| push.map(Bytes::copy_from_slice))
        .collect()
}

/// An encoded container script.
///
/// Construction through [`ScriptBuilder`] or [`Script::from_container`]
/// guarantees the marker byte is present and every push is well formed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Script(Bytes);

impl Script {
    /// Start building a container script.
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// Validate `bytes` as a container opened by [`CONTAINER_MARKER`].
    pub fn from_container(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        match bytes.first() {
            None => return Err(ScriptError::MissingMarker),
            Some(&found) if found != CONTAINER_MARKER => {
                return Err(ScriptError::UnexpectedMarker { found });
            }
            Some(_) => {}
        }
        Pushes::new(&bytes)?.try_for_each(|push| push.map(|_| ()))?;
        Ok(Self(bytes))
    }

    /// Iterate the pushes of this script.
    pub fn pushes(&self) -> Pushes<'_> {
        Pushes {
            script: &self.0,
            offset: 1,
            failed: false,
        }
    }

    /// Raw script bytes, marker included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes, marker included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the script holds only its marker byte.
    pub fn is_empty(&self) -> bool {
        self.0.len() <= 1
    }

    /// Lowercase hex of the full script.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Script> for Bytes {
    fn from(script: Script) -> Self {
        script.0
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({} bytes)", self.0.len())
    }
}

/// Incremental builder for container scripts.
#[derive(Debug)]
pub struct ScriptBuilder {
    buf: BytesMut,
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[CONTAINER_MARKER]);
        Self { buf }
    }
}

impl ScriptBuilder {
    /// Append one push.
    pub fn push(mut self, data: impl AsRef<[u8]>) -> Result<Self> {
        let data = data.as_ref();
        self.buf
            .reserve(PushWidth::for_len(data.len())?.header_len() + data.len());
        write_push(&mut self.buf, data)?;
        Ok(self)
    }

    /// Append one push per item, in order.
    pub fn push_all<I, T>(self, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        items.into_iter().try_fold(self, |builder, item| builder.push(item))
    }

    /// Finish the script.
    pub fn build(self) -> Script {
        Script(self.buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builder_layout() {
        let script = Script::builder()
            .push(b"ns")
            .unwrap()
            .push(b"")
            .unwrap()
            .push([0xffu8; 80])
            .unwrap()
            .build();

        let bytes = script.as_bytes();
        assert_eq!(bytes[0], CONTAINER_MARKER);
        assert_eq!(&bytes[1..4], &[0x02, b'n', b's']);
        assert_eq!(bytes[4], 0x00);
        assert_eq!(&bytes[5..7], &[crate::OP_PUSHDATA1, 80]);
        assert_eq!(script.len(), 1 + 3 + 1 + 2 + 80);
    }

    #[test]
    fn test_pushes_roundtrip_in_order() {
        let items: Vec<Vec<u8>> = vec![b"a".to_vec(), vec![], vec![9; 300], vec![1; 75]];
        let script = Script::builder().push_all(&items).unwrap().build();
        let decoded: Vec<&[u8]> = script.pushes().collect::<Result<_>>().unwrap();
        assert_eq!(decoded.len(), items.len());
        for (got, want) in decoded.iter().zip(&items) {
            assert_eq!(*got, want.as_slice());
        }
    }

    #[test]
    fn test_decode_skips_any_marker() {
        let pushes = decode_pushes(&[0x00, 0x01, 0x42]).unwrap();
        assert_eq!(pushes, vec![Bytes::from_static(&[0x42])]);
    }

    #[test]
    fn test_marker_only_has_no_pushes() {
        assert!(decode_pushes(&[CONTAINER_MARKER]).unwrap().is_empty());
        assert!(Script::builder().build().is_empty());
    }

    #[test]
    fn test_empty_script_missing_marker() {
        assert_matches!(decode_pushes(&[]), Err(ScriptError::MissingMarker));
        assert_matches!(Script::from_container(Vec::new()), Err(ScriptError::MissingMarker));
    }

    #[test]
    fn test_from_container_checks_marker() {
        assert_matches!(
            Script::from_container(vec![0x76, 0x00]),
            Err(ScriptError::UnexpectedMarker { found: 0x76 })
        );
    }

    #[test]
    fn test_from_container_rejects_bad_push() {
        assert_matches!(
            Script::from_container(vec![CONTAINER_MARKER, 0x03, 0x01]),
            Err(ScriptError::Truncated { .. })
        );
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let script = [CONTAINER_MARKER, 0x01, 0xaa, 0xf0, 0x01, 0xbb];
        let items: Vec<_> = Pushes::new(&script).unwrap().collect();
        assert_eq!(items.len(), 2);
        assert_matches!(items[1], Err(ScriptError::UnknownOpcode { offset: 3, opcode: 0xf0 }));
    }
}
