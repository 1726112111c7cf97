//! Shared codecs and types for sflwire
//!
//! This crate contains the byte-level encoders used by instrumented programs
//! to write execution traces: tagged variable-length ids, the event frame
//! layout, and a protocol-4 pickle encoder for observed values. Everything
//! here is a pure function of its inputs; writing the bytes somewhere is the
//! caller's job.

pub mod error;
pub mod protocol;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::CodecError;
pub use protocol::{frame, pickle::pickle, varlen::TaggedInt};
pub use types::{events::*, value::Value};
