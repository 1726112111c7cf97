//! Wire encoders
//!
//! Leaves first: [`varlen`] and [`bigint`] are used by [`pickle`], and
//! [`frame`] embeds pickled values.

pub mod bigint;
pub mod frame;
pub mod pickle;
pub mod varlen;
