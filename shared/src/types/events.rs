//! Event type definitions for execution traces
//!
//! These types represent the probe hits emitted by instrumented code. The
//! numeric [`EventType`] values are shared with the analyzer and are
//! append-only.

use crate::error::CodecError;
use crate::protocol::frame;
use crate::protocol::pickle::pickle;
use crate::types::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an instrumented probe point
pub type EventId = u32;

/// Identifier of an observed variable
pub type VarId = u32;

/// Kind of probe. The discriminant is the wire-level event type number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventType {
    Line = 0,
    Branch = 1,
    FunctionEnter = 2,
    FunctionExit = 3,
    FunctionError = 4,
    Def = 5,
    Use = 6,
    Condition = 7,
    LoopBegin = 8,
    LoopHit = 9,
    LoopEnd = 10,
    Len = 11,
    TestStart = 12,
    TestEnd = 13,
    TestLine = 14,
    TestDef = 15,
    TestUse = 16,
    TestAssert = 17,
}

impl EventType {
    pub const ALL: [EventType; 18] = [
        EventType::Line,
        EventType::Branch,
        EventType::FunctionEnter,
        EventType::FunctionExit,
        EventType::FunctionError,
        EventType::Def,
        EventType::Use,
        EventType::Condition,
        EventType::LoopBegin,
        EventType::LoopHit,
        EventType::LoopEnd,
        EventType::Len,
        EventType::TestStart,
        EventType::TestEnd,
        EventType::TestLine,
        EventType::TestDef,
        EventType::TestUse,
        EventType::TestAssert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Line => "line",
            EventType::Branch => "branch",
            EventType::FunctionEnter => "function_enter",
            EventType::FunctionExit => "function_exit",
            EventType::FunctionError => "function_error",
            EventType::Def => "def",
            EventType::Use => "use",
            EventType::Condition => "condition",
            EventType::LoopBegin => "loop_begin",
            EventType::LoopHit => "loop_hit",
            EventType::LoopEnd => "loop_end",
            EventType::Len => "len",
            EventType::TestStart => "test_start",
            EventType::TestEnd => "test_end",
            EventType::TestLine => "test_line",
            EventType::TestDef => "test_def",
            EventType::TestUse => "test_use",
            EventType::TestAssert => "test_assert",
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        EventType::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(CodecError::UnknownEventType(value))
    }
}

impl From<EventType> for u8 {
    fn from(t: EventType) -> u8 {
        t as u8
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| CodecError::UnknownEventName(s.to_string()))
    }
}

/// A single probe hit, ready to be framed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Line { event_id: EventId },
    Branch { event_id: EventId },
    FunctionEnter { event_id: EventId },
    /// `value` is `None` when the exit carries no return value
    FunctionExit {
        event_id: EventId,
        value: Option<Value>,
    },
    FunctionError { event_id: EventId },
    /// `value` is `None` for a base definition (ids only)
    Def {
        event_id: EventId,
        var_id: VarId,
        value: Option<Value>,
    },
    Use { event_id: EventId, var_id: VarId },
    Condition { event_id: EventId, value: bool },
    LoopBegin { event_id: EventId },
    LoopHit { event_id: EventId },
    LoopEnd { event_id: EventId },
    Len {
        event_id: EventId,
        var_id: VarId,
        length: u32,
    },
    TestStart { event_id: EventId },
    TestEnd { event_id: EventId },
    TestLine { event_id: EventId },
    TestDef { event_id: EventId, var_id: VarId },
    TestUse { event_id: EventId, var_id: VarId },
    TestAssert { event_id: EventId },
}

impl Event {
    /// Get the wire event type of any event
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Line { .. } => EventType::Line,
            Event::Branch { .. } => EventType::Branch,
            Event::FunctionEnter { .. } => EventType::FunctionEnter,
            Event::FunctionExit { .. } => EventType::FunctionExit,
            Event::FunctionError { .. } => EventType::FunctionError,
            Event::Def { .. } => EventType::Def,
            Event::Use { .. } => EventType::Use,
            Event::Condition { .. } => EventType::Condition,
            Event::LoopBegin { .. } => EventType::LoopBegin,
            Event::LoopHit { .. } => EventType::LoopHit,
            Event::LoopEnd { .. } => EventType::LoopEnd,
            Event::Len { .. } => EventType::Len,
            Event::TestStart { .. } => EventType::TestStart,
            Event::TestEnd { .. } => EventType::TestEnd,
            Event::TestLine { .. } => EventType::TestLine,
            Event::TestDef { .. } => EventType::TestDef,
            Event::TestUse { .. } => EventType::TestUse,
            Event::TestAssert { .. } => EventType::TestAssert,
        }
    }

    /// Get the probe id of any event
    pub fn event_id(&self) -> EventId {
        match *self {
            Event::Line { event_id }
            | Event::Branch { event_id }
            | Event::FunctionEnter { event_id }
            | Event::FunctionExit { event_id, .. }
            | Event::FunctionError { event_id }
            | Event::Def { event_id, .. }
            | Event::Use { event_id, .. }
            | Event::Condition { event_id, .. }
            | Event::LoopBegin { event_id }
            | Event::LoopHit { event_id }
            | Event::LoopEnd { event_id }
            | Event::Len { event_id, .. }
            | Event::TestStart { event_id }
            | Event::TestEnd { event_id }
            | Event::TestLine { event_id }
            | Event::TestDef { event_id, .. }
            | Event::TestUse { event_id, .. }
            | Event::TestAssert { event_id } => event_id,
        }
    }

    /// Encode this event as a single frame.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Event::Line { event_id }
            | Event::Branch { event_id }
            | Event::FunctionEnter { event_id }
            | Event::FunctionExit {
                event_id,
                value: None,
            }
            | Event::FunctionError { event_id }
            | Event::LoopBegin { event_id }
            | Event::LoopHit { event_id }
            | Event::LoopEnd { event_id }
            | Event::TestStart { event_id }
            | Event::TestEnd { event_id }
            | Event::TestLine { event_id }
            | Event::TestAssert { event_id } => frame::encode_event(*event_id),
            Event::FunctionExit {
                event_id,
                value: Some(value),
            } => frame::encode_function_exit_event(*event_id, &pickle(value), value.type_name()),
            Event::Def {
                event_id,
                var_id,
                value: Some(value),
            } => frame::encode_def_event(*event_id, *var_id, &pickle(value), value.type_name()),
            Event::Def {
                event_id,
                var_id,
                value: None,
            }
            | Event::TestDef { event_id, var_id } => {
                frame::encode_base_def_event(*event_id, *var_id)
            }
            Event::Use { event_id, var_id } | Event::TestUse { event_id, var_id } => {
                frame::encode_use_event(*event_id, *var_id)
            }
            Event::Condition { event_id, value } => {
                frame::encode_condition_event(*event_id, *value)
            }
            Event::Len {
                event_id,
                var_id,
                length,
            } => frame::encode_len_event(*event_id, *var_id, *length),
        }
    }
}
