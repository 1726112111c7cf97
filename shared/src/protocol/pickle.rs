//! Protocol-4 pickle encoder for scalar values
//!
//! Output is byte-identical to what the reference pickler produces for the
//! same scalar, so the analyzer can hand the embedded bytes straight to its
//! native `loads`. Layout:
//!
//! ```text
//! PROTO 0x04 [FRAME <u64 le payload len>] <opcodes> STOP
//! ```
//!
//! The frame block is written when the payload (opcodes plus `STOP`) is at
//! least [`FRAME_SIZE_MIN`] bytes, except for text and byte values of
//! [`FRAME_SIZE_TARGET`] bytes or more, which the reference pickler writes
//! outside any frame.

use crate::protocol::bigint::encode_long;
use crate::types::value::Value;
use bytes::BufMut;
use tracing::warn;

/// Pickle protocol version written after `PROTO`
pub const PROTOCOL: u8 = 4;

pub const PROTO: u8 = 0x80;
pub const STOP: u8 = b'.';
pub const NONE: u8 = b'N';
pub const NEWTRUE: u8 = 0x88;
pub const NEWFALSE: u8 = 0x89;
pub const BININT: u8 = b'J';
pub const BININT1: u8 = b'K';
pub const BININT2: u8 = b'M';
pub const LONG1: u8 = 0x8a;
pub const LONG4: u8 = 0x8b;
pub const BINFLOAT: u8 = b'G';
pub const SHORT_BINUNICODE: u8 = 0x8c;
pub const BINUNICODE: u8 = b'X';
pub const SHORT_BINBYTES: u8 = b'C';
pub const BINBYTES: u8 = b'B';
pub const MEMOIZE: u8 = 0x94;
pub const FRAME: u8 = 0x95;

/// Smallest payload that gets a frame block
pub const FRAME_SIZE_MIN: usize = 4;
/// Text and byte values at least this long are never framed
pub const FRAME_SIZE_TARGET: usize = 64 * 1024;

const FRAME_HEADER_LEN: usize = 1 + 8;

/// One scalar, resolved to the opcode that will carry it
#[derive(Debug)]
enum Item<'a> {
    None,
    Int1(u8),
    Int2(u16),
    Int4(i32),
    Long(Vec<u8>),
    Float(f64),
    Bool(bool),
    Text(&'a [u8]),
    Bytes(&'a [u8]),
}

impl<'a> Item<'a> {
    fn plan(value: &'a Value) -> Self {
        match value {
            Value::None | Value::Unsupported { .. } => Item::None,
            Value::I8(v) => Item::int(i64::from(*v)),
            Value::I16(v) => Item::int(i64::from(*v)),
            Value::I32(v) => Item::int(i64::from(*v)),
            Value::I64(v) => Item::int(*v),
            Value::F32(v) => Item::Float(f64::from(*v)),
            Value::F64(v) => Item::Float(*v),
            Value::Bool(v) => Item::Bool(*v),
            Value::Str(s) => Item::sized(s.as_bytes(), Item::Text),
            Value::Bytes(b) => Item::sized(b, Item::Bytes),
        }
    }

    fn int(v: i64) -> Self {
        if let Ok(small) = u8::try_from(v) {
            Item::Int1(small)
        } else if let Ok(medium) = u16::try_from(v) {
            Item::Int2(medium)
        } else if let Ok(word) = i32::try_from(v) {
            Item::Int4(word)
        } else {
            Item::Long(encode_long(v))
        }
    }

    /// Lengths above `u32::MAX` need opcodes outside the supported set.
    fn sized(data: &'a [u8], make: fn(&'a [u8]) -> Self) -> Self {
        if u32::try_from(data.len()).is_ok() {
            make(data)
        } else {
            warn!(len = data.len(), "value too large to pickle, recording None");
            Item::None
        }
    }

    /// Opcode bytes for this item, excluding `STOP`
    fn len(&self) -> usize {
        match self {
            Item::None | Item::Bool(_) => 1,
            Item::Int1(_) => 2,
            Item::Int2(_) => 3,
            Item::Int4(_) => 5,
            Item::Long(bytes) if bytes.len() < 256 => 2 + bytes.len(),
            Item::Long(bytes) => 5 + bytes.len(),
            Item::Float(_) => 9,
            Item::Text(data) | Item::Bytes(data) if data.len() < 256 => 2 + data.len() + 1,
            Item::Text(data) | Item::Bytes(data) => 5 + data.len() + 1,
        }
    }

    fn frameable(&self) -> bool {
        match self {
            Item::Text(data) | Item::Bytes(data) => data.len() < FRAME_SIZE_TARGET,
            _ => true,
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        match self {
            Item::None => buf.put_u8(NONE),
            Item::Bool(true) => buf.put_u8(NEWTRUE),
            Item::Bool(false) => buf.put_u8(NEWFALSE),
            Item::Int1(v) => {
                buf.put_u8(BININT1);
                buf.put_u8(*v);
            }
            Item::Int2(v) => {
                buf.put_u8(BININT2);
                buf.put_u16_le(*v);
            }
            Item::Int4(v) => {
                buf.put_u8(BININT);
                buf.put_i32_le(*v);
            }
            Item::Long(bytes) => {
                if bytes.len() < 256 {
                    buf.put_u8(LONG1);
                    buf.put_u8(bytes.len() as u8);
                } else {
                    buf.put_u8(LONG4);
                    buf.put_u32_le(bytes.len() as u32);
                }
                buf.put_slice(bytes);
            }
            Item::Float(v) => {
                buf.put_u8(BINFLOAT);
                buf.put_f64(*v);
            }
            Item::Text(data) => put_counted(buf, SHORT_BINUNICODE, BINUNICODE, data),
            Item::Bytes(data) => put_counted(buf, SHORT_BINBYTES, BINBYTES, data),
        }
    }
}

/// Length-prefixed payload followed by `MEMOIZE`. `data.len()` fits in u32,
/// checked by `Item::sized`.
fn put_counted<B: BufMut>(buf: &mut B, short_op: u8, long_op: u8, data: &[u8]) {
    if data.len() < 256 {
        buf.put_u8(short_op);
        buf.put_u8(data.len() as u8);
    } else {
        buf.put_u8(long_op);
        buf.put_u32_le(data.len() as u32);
    }
    buf.put_slice(data);
    buf.put_u8(MEMOIZE);
}

/// Pickle `value` with protocol 4.
pub fn pickle(value: &Value) -> Vec<u8> {
    let item = Item::plan(value);
    let payload_len = item.len() + 1;
    let framed = item.frameable() && payload_len >= FRAME_SIZE_MIN;

    let total = 2 + if framed { FRAME_HEADER_LEN } else { 0 } + payload_len;
    let mut out = Vec::with_capacity(total);

    out.put_u8(PROTO);
    out.put_u8(PROTOCOL);
    if framed {
        out.put_u8(FRAME);
        out.put_u64_le(payload_len as u64);
    }
    item.write(&mut out);
    out.put_u8(STOP);

    debug_assert_eq!(out.len(), total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![PROTO, PROTOCOL, FRAME];
        out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_none() {
        assert_eq!(pickle(&Value::None), [0x80, 0x04, b'N', b'.']);
    }

    #[test]
    fn test_unsupported_degrades_to_none() {
        let value = Value::unsupported("class Foo");
        assert_eq!(pickle(&value), pickle(&Value::None));
    }

    #[test]
    fn test_small_ints_are_unframed() {
        assert_eq!(pickle(&Value::I32(0)), [0x80, 0x04, b'K', 0x00, b'.']);
        assert_eq!(pickle(&Value::I32(1)), [0x80, 0x04, b'K', 0x01, b'.']);
        assert_eq!(pickle(&Value::I32(127)), [0x80, 0x04, b'K', 0x7F, b'.']);
        assert_eq!(pickle(&Value::I32(255)), [0x80, 0x04, b'K', 0xFF, b'.']);
        assert_eq!(pickle(&Value::I8(5)), [0x80, 0x04, b'K', 0x05, b'.']);
    }

    #[test]
    fn test_binint2() {
        assert_eq!(
            pickle(&Value::I32(32767)),
            framed(&[b'M', 0xFF, 0x7F, b'.'])
        );
        assert_eq!(
            pickle(&Value::I16(256)),
            framed(&[b'M', 0x00, 0x01, b'.'])
        );
    }

    #[test]
    fn test_negative_ints_use_binint() {
        assert_eq!(
            pickle(&Value::I32(-1)),
            [
                0x80, 0x04, 0x95, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x4A, 0xFF,
                0xFF, 0xFF, 0xFF, 0x2E
            ]
        );
        assert_eq!(
            pickle(&Value::I32(-256)),
            framed(&[b'J', 0x00, 0xFF, 0xFF, 0xFF, b'.'])
        );
        assert_eq!(
            pickle(&Value::I32(-32768)),
            framed(&[b'J', 0x00, 0x80, 0xFF, 0xFF, b'.'])
        );
        assert_eq!(
            pickle(&Value::I8(-128)),
            framed(&[b'J', 0x80, 0xFF, 0xFF, 0xFF, b'.'])
        );
    }

    #[test]
    fn test_i64_in_i32_range_matches_i32() {
        for v in [0_i32, 1, -1, 255, 256, 65535, 65536, i32::MAX, i32::MIN] {
            assert_eq!(pickle(&Value::I64(i64::from(v))), pickle(&Value::I32(v)), "{v}");
        }
    }

    #[test]
    fn test_every_int_width_uses_narrowest_opcode() {
        let expected = framed(&[b'M', 0x2C, 0x01, b'.']);
        assert_eq!(pickle(&Value::I16(300)), expected);
        assert_eq!(pickle(&Value::I32(300)), expected);
        assert_eq!(pickle(&Value::I64(300)), expected);

        let expected = framed(&[b'J', 0xFE, 0xFF, 0xFF, 0xFF, b'.']);
        assert_eq!(pickle(&Value::I8(-2)), expected);
        assert_eq!(pickle(&Value::I16(-2)), expected);
        assert_eq!(pickle(&Value::I32(-2)), expected);
        assert_eq!(pickle(&Value::I64(-2)), expected);
    }

    #[test]
    fn test_long1() {
        assert_eq!(
            pickle(&Value::I64(424_242_424_242)),
            framed(&[0x8A, 0x05, 0xB2, 0xA9, 0xD1, 0xC6, b'b', b'.'])
        );
        assert_eq!(
            pickle(&Value::I64(-424_242_424_242)),
            framed(&[0x8A, 0x05, b'N', b'V', b'.', b'9', 0x9D, b'.'])
        );
        assert_eq!(
            pickle(&Value::I64(i64::from(i32::MAX) + 1)),
            framed(&[0x8A, 0x05, 0x00, 0x00, 0x00, 0x80, 0x00, b'.'])
        );
    }

    #[test]
    fn test_bool() {
        assert_eq!(pickle(&Value::Bool(true)), [0x80, 0x04, 0x88, 0x2E]);
        assert_eq!(pickle(&Value::Bool(false)), [0x80, 0x04, 0x89, 0x2E]);
    }

    #[test]
    fn test_float_is_big_endian_double() {
        assert_eq!(
            pickle(&Value::F64(0.1)),
            framed(&[b'G', b'?', 0xB9, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9A, b'.'])
        );
        assert_eq!(
            pickle(&Value::F64(-0.0001)),
            framed(&[b'G', 0xBF, 0x1A, b'6', 0xE2, 0xEB, 0x1C, b'C', b'-', b'.'])
        );
        assert_eq!(
            pickle(&Value::F64(0.424242424242)),
            framed(&[b'G', b'?', 0xDB, b'&', 0xC9, 0xB2, b'l', b'}', b'L', b'.'])
        );
    }

    #[test]
    fn test_f32_is_widened() {
        assert_eq!(pickle(&Value::F32(0.5)), pickle(&Value::F64(0.5)));
        assert_eq!(
            pickle(&Value::F32(0.1)),
            pickle(&Value::F64(f64::from(0.1_f32)))
        );
    }

    #[test]
    fn test_empty_bytes() {
        assert_eq!(
            pickle(&Value::Bytes(vec![])),
            [
                0x80, 0x04, 0x95, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x43, 0x00,
                0x94, 0x2E
            ]
        );
    }

    #[test]
    fn test_short_bytes() {
        let mut payload = vec![b'C', 0x10];
        payload.extend_from_slice(&[0; 16]);
        payload.extend_from_slice(&[MEMOIZE, STOP]);
        assert_eq!(pickle(&Value::Bytes(vec![0; 16])), framed(&payload));
    }

    #[test]
    fn test_binbytes() {
        let mut payload = vec![b'B', 0x00, 0x01, 0x00, 0x00];
        payload.extend_from_slice(&[0; 256]);
        payload.extend_from_slice(&[MEMOIZE, STOP]);
        let out = pickle(&Value::Bytes(vec![0; 256]));
        assert_eq!(out, framed(&payload));
        assert_eq!(&out[3..11], &[0x07, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_large_bytes_are_unframed() {
        let out = pickle(&Value::Bytes(vec![0; FRAME_SIZE_TARGET]));
        assert_eq!(out.len(), 65545);
        assert_eq!(&out[..7], &[0x80, 0x04, b'B', 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(&out[65543..], &[MEMOIZE, STOP]);
    }

    #[test]
    fn test_bytes_just_below_target_are_framed() {
        let out = pickle(&Value::Bytes(vec![0; FRAME_SIZE_TARGET - 1]));
        assert_eq!(out[2], FRAME);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            pickle(&Value::from("")),
            framed(&[0x8C, 0x00, MEMOIZE, STOP])
        );
        assert_eq!(
            pickle(&Value::from("0")),
            framed(&[0x8C, 0x01, b'0', MEMOIZE, STOP])
        );
    }

    #[test]
    fn test_string_length_counts_utf8_bytes() {
        // two characters, five bytes
        let out = pickle(&Value::from("é€"));
        assert_eq!(
            out,
            framed(&[0x8C, 0x05, 0xC3, 0xA9, 0xE2, 0x82, 0xAC, MEMOIZE, STOP])
        );
    }

    #[test]
    fn test_binunicode() {
        let text = "0".repeat(256);
        let out = pickle(&Value::Str(text));
        assert_eq!(out.len(), 274);
        assert_eq!(&out[..4], &[0x80, 0x04, 0x95, 0x07]);
        assert_eq!(out[4], 0x01);
        assert_eq!(&out[11..16], &[b'X', 0x00, 0x01, 0x00, 0x00]);
        assert!(out[16..272].iter().all(|&b| b == b'0'));
        assert_eq!(&out[272..], &[MEMOIZE, STOP]);
    }

    #[test]
    fn test_large_string_is_unframed() {
        let out = pickle(&Value::Str("0".repeat(FRAME_SIZE_TARGET)));
        assert_eq!(out.len(), 65545);
        assert_eq!(&out[..7], &[0x80, 0x04, b'X', 0x00, 0x00, 0x01, 0x00]);
        assert!(out[7..65543].iter().all(|&b| b == b'0'));
        assert_eq!(&out[65543..], &[MEMOIZE, STOP]);
    }

    #[test]
    fn test_pickle_is_deterministic() {
        let value = Value::from("repeat me");
        assert_eq!(pickle(&value), pickle(&value));
    }
}
