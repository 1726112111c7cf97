//! Codec error types
//!
//! Encoding itself never fails. The only fallible path is the checked
//! tagged-integer constructor, for callers that would rather reject an id
//! than have it silently truncated on the wire.

use thiserror::Error;

/// Result alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by the checked codec entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Value does not fit a 4-byte tagged integer
    #[error("{value} is out of range for a tagged integer (0..={max})", max = u32::MAX)]
    OutOfRange { value: i64 },

    /// Unknown numeric event type
    #[error("unknown event type: {0}")]
    UnknownEventType(u8),

    /// Unknown event type name
    #[error("unknown event type name: {0}")]
    UnknownEventName(String),
}
