//! Single push encoding and decoding.

use bytes::BufMut;

use crate::{
    MAX_DIRECT_PUSH, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4,
    error::{Result, ScriptError},
};

/// Width class of a push length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PushWidth {
    /// Length carried by the opcode itself (0..=75).
    Direct,
    /// `OP_PUSHDATA1` followed by a 1-byte length (76..=255).
    Extended8,
    /// `OP_PUSHDATA2` followed by a 2-byte length (256..=65535).
    Extended16,
    /// `OP_PUSHDATA4` followed by a 4-byte length (65536..=u32::MAX).
    Extended32,
}

impl PushWidth {
    /// The narrowest width able to carry `len` bytes.
    pub fn for_len(len: usize) -> Result<Self> {
        match len {
            0..=MAX_DIRECT_PUSH => Ok(Self::Direct),
            76..=0xff => Ok(Self::Extended8),
            0x100..=0xffff => Ok(Self::Extended16),
            _ if u32::try_from(len).is_ok() => Ok(Self::Extended32),
            _ => Err(ScriptError::PushTooLarge { len }),
        }
    }

    /// Width class announced by an opcode, if it is a push opcode.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0..=0x4b => Some(Self::Direct),
            OP_PUSHDATA1 => Some(Self::Extended8),
            OP_PUSHDATA2 => Some(Self::Extended16),
            OP_PUSHDATA4 => Some(Self::Extended32),
            _ => None,
        }
    }

    /// Number of length bytes following the opcode.
    pub const fn length_bytes(&self) -> usize {
        match self {
            Self::Direct => 0,
            Self::Extended8 => 1,
            Self::Extended16 => 2,
            Self::Extended32 => 4,
        }
    }

    /// Total header size including the opcode.
    pub const fn header_len(&self) -> usize {
        1 + self.length_bytes()
    }
}

/// Append one push carrying `data` to `dst`, using the minimal-width prefix.
pub fn write_push<B: BufMut>(dst: &mut B, data: &[u8]) -> Result<()> {
    let len = data.len();
    match PushWidth::for_len(len)? {
        // The range checks in `for_len` make each narrowing cast lossless.
        PushWidth::Direct => dst.put_u8(len as u8),
        PushWidth::Extended8 => {
            dst.put_u8(OP_PUSHDATA1);
            dst.put_u8(len as u8);
        }
        PushWidth::Extended16 => {
            dst.put_u8(OP_PUSHDATA2);
            dst.put_u16_le(len as u16);
        }
        PushWidth::Extended32 => {
            dst.put_u8(OP_PUSHDATA4);
            dst.put_u32_le(len as u32);
        }
    }
    dst.put_slice(data);
    Ok(())
}

/// Encode `data` as a standalone push fragment.
pub fn encode_push(data: &[u8]) -> Result<Vec<u8>> {
    let width = PushWidth::for_len(data.len())?;
    let mut out = Vec::with_capacity(width.header_len() + data.len());
    write_push(&mut out, data)?;
    Ok(out)
}

/// Decode the push starting at `offset`.
///
/// Returns the pushed bytes and the offset just past them. Fails with
/// [`ScriptError::Truncated`] when the header or data runs past the end of
/// `script`, and with [`ScriptError::UnknownOpcode`] when the byte at `offset`
/// is not a push opcode.
pub fn decode_next_push(script: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let opcode = *script.get(offset).ok_or(ScriptError::Truncated {
        offset,
        declared: 1,
        available: 0,
    })?;
    // `offset` indexes into `script`, so neither addition below can overflow.
    let available = script.len() - offset - 1;
    let width = PushWidth::from_opcode(opcode)
        .ok_or(ScriptError::UnknownOpcode { offset, opcode })?;

    let length_start = offset + 1;
    let data_start = length_start + width.length_bytes();
    let length_bytes = script
        .get(length_start..data_start)
        .ok_or(ScriptError::Truncated {
            offset,
            declared: width.length_bytes(),
            available,
        })?;

    let len = match width {
        PushWidth::Direct => opcode as usize,
        _ => {
            let mut le = [0u8; 4];
            le.iter_mut()
                .zip(length_bytes)
                .for_each(|(dst, src)| *dst = *src);
            u32::from_le_bytes(le) as usize
        }
    };

    let end = data_start
        .checked_add(len)
        .ok_or(ScriptError::PushTooLarge { len })?;
    let data = script.get(data_start..end).ok_or(ScriptError::Truncated {
        offset,
        declared: width.length_bytes() + len,
        available,
    })?;

    Ok((data, end))
}
