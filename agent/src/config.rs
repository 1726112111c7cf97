//! Configuration types for the event recorder

use std::path::PathBuf;

/// Output file used when `EVENTS_PATH` is not set
pub const DEFAULT_EVENTS_PATH: &str = "EVENTS_PATH";

/// Default write buffer capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// How the trace file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Start a fresh trace, discarding any previous contents
    #[default]
    Truncate,
    /// Keep previous contents and add to the end
    Append,
}

impl std::str::FromStr for OpenMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truncate" => Ok(OpenMode::Truncate),
            "append" => Ok(OpenMode::Append),
            _ => anyhow::bail!("Invalid open mode: {}", s),
        }
    }
}

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Trace output path
    pub events_path: PathBuf,

    /// Write buffer capacity in bytes
    pub buffer_size: usize,

    /// Whether an existing trace is truncated or appended to
    pub open_mode: OpenMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events_path: PathBuf::from(DEFAULT_EVENTS_PATH),
            buffer_size: DEFAULT_BUFFER_SIZE,
            open_mode: OpenMode::default(),
        }
    }
}

impl Config {
    /// Build configuration from `EVENTS_PATH`, `SFLWIRE_BUFFER_SIZE` and
    /// `SFLWIRE_OPEN_MODE`. Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            events_path: lookup("EVENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.events_path),
            buffer_size: lookup("SFLWIRE_BUFFER_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.buffer_size),
            open_mode: lookup("SFLWIRE_OPEN_MODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.open_mode),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.events_path.as_os_str().is_empty() {
            anyhow::bail!("Events path must not be empty");
        }

        if self.buffer_size == 0 {
            anyhow::bail!("Buffer size must be greater than 0");
        }

        Ok(())
    }
}
