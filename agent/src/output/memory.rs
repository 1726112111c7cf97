//! In-memory trace sink

use super::{EventSink, SinkError};
use std::sync::{Arc, Mutex};

/// Sink backed by a shared byte buffer.
///
/// Clones share the same buffer, so a caller can hand one clone to a
/// recorder and read the trace back through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written since the last reset
    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buf.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn write(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        self.buf
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .extend_from_slice(frame);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.buf.lock().map_err(|_| SinkError::Poisoned)?.clear();
        Ok(())
    }
}
