//! Tagged variable-length integers
//!
//! Every id in an event frame is written as `[width][width big-endian bytes]`
//! where `width` is the smallest of 1..=4 bytes that holds the value. The
//! width byte lets a reader size the field without lookahead.
//!
//! Fixed-width helpers for the 2- and 4-byte length fields live here too;
//! those carry no width prefix.

use crate::error::{CodecError, Result};
use bytes::BufMut;
use tracing::warn;

/// Widest tagged integer, in bytes
pub const MAX_WIDTH: u8 = 4;

/// Number of bytes needed for `x` in a tagged field.
///
/// Negative values always take the full 4 bytes, matching their 32-bit
/// two's-complement form.
pub fn byte_width(x: i64) -> u8 {
    match x {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => MAX_WIDTH,
    }
}

/// A value ready to be written as a tagged integer.
///
/// The wire domain is 32 bits. Construct with [`TaggedInt::wrapping`] for
/// trace-compatible truncation or [`TaggedInt::checked`] to reject values
/// that would lose bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaggedInt(u32);

impl TaggedInt {
    /// Keep `x mod 2^32`. Negative values become their 32-bit two's complement.
    pub fn wrapping(x: i64) -> Self {
        let truncated = x as u32;
        if i64::from(truncated) != x && i64::from(truncated as i32) != x {
            warn!(value = x, written = truncated, "tagged integer truncated to 32 bits");
        }
        Self(truncated)
    }

    /// Accept only `0..=u32::MAX`.
    pub fn checked(x: i64) -> Result<Self> {
        u32::try_from(x)
            .map(Self)
            .map_err(|_| CodecError::OutOfRange { value: x })
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Width byte that will precede the value
    pub fn width(self) -> u8 {
        byte_width(i64::from(self.0))
    }

    /// Bytes occupied on the wire, width prefix included
    pub fn encoded_len(self) -> usize {
        1 + usize::from(self.width())
    }

    pub fn put<B: BufMut>(self, buf: &mut B) {
        put_tagged(buf, self.0);
    }
}

impl From<u32> for TaggedInt {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

/// Bytes a tagged `x` occupies, width prefix included
pub fn tagged_len(x: u32) -> usize {
    TaggedInt(x).encoded_len()
}

/// Write `x` as `[width][big-endian bytes]`.
pub fn put_tagged<B: BufMut>(buf: &mut B, x: u32) {
    let width = byte_width(i64::from(x));
    buf.put_u8(width);
    buf.put_uint(u64::from(x), usize::from(width));
}

/// Write exactly 2 big-endian bytes
pub fn put_u16_be<B: BufMut>(buf: &mut B, x: u16) {
    buf.put_u16(x);
}

/// Write exactly 4 big-endian bytes
pub fn put_u32_be<B: BufMut>(buf: &mut B, x: u32) {
    buf.put_u32(x);
}
