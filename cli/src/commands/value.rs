//! Value arguments shared by `encode` and `pickle`

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use sflwire_shared::utils::hex_to_bytes;
use sflwire_shared::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    None,
    Int,
    Long,
    Float,
    Double,
    Bool,
    Str,
    Bytes,
}

#[derive(Args, Debug, Default)]
pub struct ValueArgs {
    /// Value type
    #[arg(id = "value_type", long = "type", value_enum)]
    pub kind: Option<ValueKind>,

    /// Value literal (hex for bytes)
    #[arg(long, allow_hyphen_values = true)]
    pub value: Option<String>,
}

impl ValueArgs {
    /// Parse the value, or `None` when no type was given
    pub fn parse(&self) -> Result<Option<Value>> {
        let Some(kind) = self.kind else {
            if self.value.is_some() {
                bail!("--value requires --type");
            }
            return Ok(None);
        };

        if kind == ValueKind::None {
            return Ok(Some(Value::None));
        }

        let raw = self
            .value
            .as_deref()
            .with_context(|| format!("--value is required for type {:?}", kind))?;

        let value = match kind {
            ValueKind::None => Value::None,
            ValueKind::Int => Value::I32(raw.parse().context("Invalid int")?),
            ValueKind::Long => Value::I64(raw.parse().context("Invalid long")?),
            ValueKind::Float => Value::F32(raw.parse().context("Invalid float")?),
            ValueKind::Double => Value::F64(raw.parse().context("Invalid double")?),
            ValueKind::Bool => Value::Bool(raw.parse().context("Invalid bool")?),
            ValueKind::Str => Value::Str(raw.to_string()),
            ValueKind::Bytes => {
                Value::Bytes(hex_to_bytes(raw).context("Invalid hex for bytes value")?)
            }
        };
        Ok(Some(value))
    }
}
