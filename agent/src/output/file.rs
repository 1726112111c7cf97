//! File-backed trace sink

use super::{EventSink, SinkError};
use crate::config::{Config, OpenMode};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Buffered trace file
pub struct FileSink {
    path: PathBuf,
    buffer_size: usize,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open the sink described by `config`
    pub fn open(config: &Config) -> Result<Self, SinkError> {
        Self::with_options(&config.events_path, config.buffer_size, config.open_mode)
    }

    /// Create (or truncate) a trace file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Self::with_options(
            path.as_ref(),
            crate::config::DEFAULT_BUFFER_SIZE,
            OpenMode::Truncate,
        )
    }

    pub fn with_options(
        path: &Path,
        buffer_size: usize,
        mode: OpenMode,
    ) -> Result<Self, SinkError> {
        let file = open_file(path, mode)?;
        info!("Writing events to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            buffer_size,
            writer: BufWriter::with_capacity(buffer_size, file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_file(path: &Path, mode: OpenMode) -> Result<File, SinkError> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OpenMode::Truncate => options.write(true).truncate(true),
        OpenMode::Append => options.append(true),
    };
    options.open(path).map_err(|source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    })
}

impl EventSink for FileSink {
    fn write(&mut self, frame: &[u8]) -> Result<(), SinkError> {
        self.writer.write_all(frame)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        let file = open_file(&self.path, OpenMode::Truncate)?;
        self.writer = BufWriter::with_capacity(self.buffer_size, file);
        debug!("Reopened {}", self.path.display());
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // BufWriter swallows flush errors on drop; surface them in the log.
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to flush {}: {}", self.path.display(), e);
        }
    }
}
