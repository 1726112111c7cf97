//! Runtime values observed at instrumentation points
//!
//! Only scalars travel in a trace. Anything else is kept as
//! [`Value::Unsupported`] so its type name still reaches the analyzer while
//! the value itself is recorded as `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single observed value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    None,
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    /// A value of a type the codec cannot carry. Pickles as `None`.
    Unsupported { type_name: String },
}

impl Value {
    /// Type name the analyzer sees for this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "None",
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => "int",
            Value::F32(_) | Value::F64(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Unsupported { type_name } => type_name,
        }
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Value::Unsupported {
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b[{} bytes]", b.len()),
            Value::Unsupported { type_name } => write!(f, "<{type_name}>"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    String => Str,
    Vec<u8> => Bytes,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}
