//! Severity levels
//!
//! Levels are ordered from least to most severe, so a record passes the
//! threshold check when `record.level >= threshold`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::LogError;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Get the rendered name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Check if this level is a warning or worse
    pub fn is_alert(&self) -> bool {
        *self >= Level::Warn
    }

    /// Parse a level accepted as a minimum threshold at initialization.
    ///
    /// Only `info`, `debug` and `warn` are configurable thresholds; the more
    /// severe levels exist only as emit calls.
    pub fn parse_threshold(s: &str) -> Result<Self, LogError> {
        match s {
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            "warn" => Ok(Level::Warn),
            other => Err(LogError::InvalidThreshold(other.to_string())),
        }
    }

    /// ANSI color code used by the text formatter
    pub(crate) fn color_code(&self) -> u8 {
        match self {
            Level::Trace | Level::Debug => 37,
            Level::Info => 36,
            Level::Warn => 33,
            Level::Error | Level::Fatal => 31,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}
