//! Event Recorder Library
//!
//! This library is the runtime half of sflwire: instrumented programs call
//! one `add_*_event` method per probe hit, the recorder encodes the frame
//! with `sflwire-shared` and hands it to an [`EventSink`].
//!
//! Recording is best-effort. A frame that cannot be delivered is counted and
//! logged, never raised into the instrumented program. Use
//! [`Recorder::record`] for the fallible form.

pub mod config;
pub mod output;

pub use config::{Config, OpenMode};
pub use output::{EventSink, FileSink, MemorySink, SinkError};

use anyhow::Context;
use sflwire_shared::frame;
use sflwire_shared::{pickle, Event, EventId, Value, VarId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Encodes probe hits and writes them to a sink.
///
/// The sink sits behind a mutex so frames from concurrent probes are never
/// interleaved. Frames land in the order the lock is acquired.
pub struct Recorder<S: EventSink = FileSink> {
    sink: Mutex<S>,
    dropped: AtomicU64,
}

impl Recorder<FileSink> {
    /// Open a file recorder configured from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(&Config::from_env())
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let sink = FileSink::open(config).context("Failed to open event sink")?;
        Ok(Self::new(sink))
    }
}

impl<S: EventSink> Recorder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
            dropped: AtomicU64::new(0),
        }
    }

    /// Encode and write one event, reporting delivery failures.
    pub fn record(&self, event: &Event) -> Result<(), SinkError> {
        self.write_frame(&event.encode())
    }

    /// Number of frames lost to delivery failures so far
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        self.lock()?.flush()
    }

    /// Flush and start a fresh trace.
    pub fn reset(&self) -> Result<(), SinkError> {
        debug!("Resetting event trace");
        self.lock()?.reset()
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, SinkError> {
        self.sink.lock().map_err(|_| SinkError::Poisoned)
    }

    fn write_frame(&self, frame: &[u8]) -> Result<(), SinkError> {
        self.lock()?.write(frame)
    }

    fn deliver(&self, frame: Vec<u8>) {
        if let Err(e) = self.write_frame(&frame) {
            let previous = self.dropped.fetch_add(1, Ordering::Relaxed);
            if previous == 0 {
                warn!("Dropping event frame: {}", e);
            } else {
                debug!("Dropping event frame ({} dropped so far): {}", previous + 1, e);
            }
        }
    }

    pub fn add_line_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_branch_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    /// Definition of `var_id` with its new value.
    pub fn add_def_event(&self, event_id: EventId, var_id: VarId, value: impl Into<Value>) {
        let value = value.into();
        self.deliver(frame::encode_def_event(
            event_id,
            var_id,
            &pickle(&value),
            value.type_name(),
        ));
    }

    /// Definition of `var_id` without recording the value.
    pub fn add_base_def_event(&self, event_id: EventId, var_id: VarId) {
        self.deliver(frame::encode_base_def_event(event_id, var_id));
    }

    pub fn add_function_enter_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    /// Function return with its return value. Pass `Value::None` for a
    /// function that returned nothing observable.
    pub fn add_function_exit_event(&self, event_id: EventId, return_value: impl Into<Value>) {
        let value = return_value.into();
        self.deliver(frame::encode_function_exit_event(
            event_id,
            &pickle(&value),
            value.type_name(),
        ));
    }

    /// Function return without a value section.
    pub fn add_void_function_exit_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_function_error_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_condition_event(&self, event_id: EventId, condition: bool) {
        self.deliver(frame::encode_condition_event(event_id, condition));
    }

    pub fn add_loop_begin_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_loop_hit_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_loop_end_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_use_event(&self, event_id: EventId, var_id: VarId) {
        self.deliver(frame::encode_use_event(event_id, var_id));
    }

    pub fn add_len_event(&self, event_id: EventId, var_id: VarId, length: u32) {
        self.deliver(frame::encode_len_event(event_id, var_id, length));
    }

    pub fn add_test_start_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_test_end_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_test_line_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }

    pub fn add_test_def_event(&self, event_id: EventId, var_id: VarId) {
        self.deliver(frame::encode_base_def_event(event_id, var_id));
    }

    pub fn add_test_use_event(&self, event_id: EventId, var_id: VarId) {
        self.deliver(frame::encode_use_event(event_id, var_id));
    }

    pub fn add_test_assert_event(&self, event_id: EventId) {
        self.deliver(frame::encode_event(event_id));
    }
}

impl<S: EventSink> Drop for Recorder<S> {
    fn drop(&mut self) {
        let sink = match self.sink.get_mut() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = sink.flush() {
            warn!("Failed to flush events on shutdown: {}", e);
        }
    }
}
