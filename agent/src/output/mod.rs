//! Trace sinks
//!
//! A sink receives encoded frames and appends them to some growing artifact.
//! Frames are written whole; the sink never sees a partial frame.

pub mod file;
pub mod memory;

pub use file::FileSink;
pub use memory::MemorySink;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while delivering bytes to a sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// The output artifact could not be opened
    #[error("failed to open trace output {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bytes could not be written or flushed
    #[error("delivery failed: {0}")]
    DeliveryFailed(#[from] io::Error),

    /// A writer panicked while holding the sink
    #[error("sink lock poisoned")]
    Poisoned,
}

/// Destination for encoded event frames
pub trait EventSink: Send {
    /// Append one encoded frame.
    fn write(&mut self, frame: &[u8]) -> Result<(), SinkError>;

    /// Push buffered bytes to the underlying artifact.
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Flush, then start a fresh artifact.
    fn reset(&mut self) -> Result<(), SinkError>;
}
