//! Container script push codec.
//!
//! A container script is a single marker byte followed by a sequence of
//! length-prefixed pushes:
//!
//! ```text
//! [marker][push]...[push]
//! ```
//!
//! Each push is encoded with the narrowest length prefix that fits:
//!
//! | Length          | Prefix                                   |
//! |-----------------|------------------------------------------|
//! | 0..=75          | one opcode byte equal to the length      |
//! | 76..=255        | `OP_PUSHDATA1` + 1-byte length           |
//! | 256..=65535     | `OP_PUSHDATA2` + 2-byte little-endian    |
//! | 65536..         | `OP_PUSHDATA4` + 4-byte little-endian    |
//!
//! This is the one bit-exact compatibility surface of the format: the same
//! logical pushes always produce the same bytes.

mod error;
mod push;
mod script;

pub use error::{Result, ScriptError};
pub use push::{PushWidth, decode_next_push, encode_push, write_push};
pub use script::{Pushes, Script, ScriptBuilder, decode_pushes};

/// Pushes an empty byte string; also the "false" prefix of data outputs.
pub const OP_FALSE: u8 = 0x00;

/// Marker byte that opens every container script.
pub const OP_RETURN: u8 = 0x6a;

/// Push with a 1-byte length.
pub const OP_PUSHDATA1: u8 = 0x4c;

/// Push with a 2-byte little-endian length.
pub const OP_PUSHDATA2: u8 = 0x4d;

/// Push with a 4-byte little-endian length.
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Largest length encoded directly in the opcode byte.
pub const MAX_DIRECT_PUSH: usize = 75;

/// Marker byte written at the start of every container built by this crate.
pub const CONTAINER_MARKER: u8 = OP_RETURN;
