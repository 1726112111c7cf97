//! Event frames
//!
//! One frame per event occurrence, concatenated with no separator. Every id
//! is a tagged integer (see [`varlen`](super::varlen)); value-carrying frames
//! append the pickled value and its type name, each behind a fixed-width
//! big-endian length so a reader can skip them without parsing.
//!
//! | kind | layout |
//! |---|---|
//! | simple | `eid` |
//! | condition | `eid` `u8` |
//! | use / base def / test def / test use | `eid` `vid` |
//! | len | `eid` `vid` `len` |
//! | def | `eid` `vid` `u32 n` `pickle[n]` `u16 m` `type[m]` |
//! | function exit | `eid` `u32 n` `pickle[n]` `u16 m` `type[m]` |
//!
//! Each encoder sizes its buffer exactly before writing.

use crate::protocol::varlen::{put_tagged, put_u16_be, put_u32_be, tagged_len};
use crate::types::events::{EventId, VarId};
use bytes::BufMut;

/// Longest type name a frame can carry
pub const MAX_TYPE_NAME_LEN: usize = u16::MAX as usize;

/// Frame for an event that carries only its id.
pub fn encode_event(event_id: EventId) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tagged_len(event_id));
    put_tagged(&mut buf, event_id);
    buf
}

pub fn encode_condition_event(event_id: EventId, value: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tagged_len(event_id) + 1);
    put_tagged(&mut buf, event_id);
    buf.put_u8(u8::from(value));
    buf
}

fn encode_pair(event_id: EventId, var_id: VarId) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tagged_len(event_id) + tagged_len(var_id));
    put_tagged(&mut buf, event_id);
    put_tagged(&mut buf, var_id);
    buf
}

pub fn encode_use_event(event_id: EventId, var_id: VarId) -> Vec<u8> {
    encode_pair(event_id, var_id)
}

/// Definition without a recorded value.
pub fn encode_base_def_event(event_id: EventId, var_id: VarId) -> Vec<u8> {
    encode_pair(event_id, var_id)
}

pub fn encode_len_event(event_id: EventId, var_id: VarId, length: u32) -> Vec<u8> {
    let mut buf =
        Vec::with_capacity(tagged_len(event_id) + tagged_len(var_id) + tagged_len(length));
    put_tagged(&mut buf, event_id);
    put_tagged(&mut buf, var_id);
    put_tagged(&mut buf, length);
    buf
}

/// Definition carrying a pickled value and its type name.
pub fn encode_def_event(
    event_id: EventId,
    var_id: VarId,
    pickled: &[u8],
    type_name: &str,
) -> Vec<u8> {
    let type_name = clamp_type_name(type_name);
    let len = tagged_len(event_id) + tagged_len(var_id) + value_section_len(pickled, type_name);
    let mut buf = Vec::with_capacity(len);
    put_tagged(&mut buf, event_id);
    put_tagged(&mut buf, var_id);
    put_value_section(&mut buf, pickled, type_name);
    debug_assert_eq!(buf.len(), len);
    buf
}

/// Function exit carrying the pickled return value and its type name.
pub fn encode_function_exit_event(event_id: EventId, pickled: &[u8], type_name: &str) -> Vec<u8> {
    let type_name = clamp_type_name(type_name);
    let len = tagged_len(event_id) + value_section_len(pickled, type_name);
    let mut buf = Vec::with_capacity(len);
    put_tagged(&mut buf, event_id);
    put_value_section(&mut buf, pickled, type_name);
    debug_assert_eq!(buf.len(), len);
    buf
}

fn value_section_len(pickled: &[u8], type_name: &str) -> usize {
    4 + pickled.len() + 2 + type_name.len()
}

fn put_value_section<B: BufMut>(buf: &mut B, pickled: &[u8], type_name: &str) {
    // pickle() never produces more than u32::MAX bytes of payload
    put_u32_be(buf, pickled.len() as u32);
    buf.put_slice(pickled);
    put_u16_be(buf, type_name.len() as u16);
    buf.put_slice(type_name.as_bytes());
}

/// Cut `name` to fit the 2-byte length field, on a char boundary.
fn clamp_type_name(name: &str) -> &str {
    if name.len() <= MAX_TYPE_NAME_LEN {
        return name;
    }
    let mut end = MAX_TYPE_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    tracing::warn!(len = name.len(), kept = end, "type name truncated");
    &name[..end]
}
