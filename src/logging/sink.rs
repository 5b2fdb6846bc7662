//! Output sinks
//!
//! A [`Sink`] receives fully rendered records. Writers are wrapped in a
//! [`WriterSink`], which serializes concurrent writers behind a mutex.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use super::level::Level;

/// Destination for rendered log records
pub trait Sink: Send + Sync {
    /// Write raw rendered bytes
    fn write_all(&self, bytes: &[u8]) -> io::Result<()>;

    /// Write one rendered record of the given level.
    ///
    /// Sinks that do not care about the level get plain `write_all`.
    fn write_record(&self, _level: Level, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

/// A sink over any [`Write`] implementation
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the writer, e.g. to inspect an in-memory buffer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(bytes)?;
        writer.flush()
    }
}

/// Sink writing to the process's standard output
pub fn stdout_sink() -> Arc<dyn Sink> {
    Arc::new(WriterSink::new(io::stdout()))
}

/// Sink writing to the process's standard error
pub fn stderr_sink() -> Arc<dyn Sink> {
    Arc::new(WriterSink::new(io::stderr()))
}

/// Open a file sink in append mode, creating parent directories as needed
pub fn open_file_sink(path: &Path) -> Result<Arc<dyn Sink>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(Arc::new(WriterSink::new(file)))
}
