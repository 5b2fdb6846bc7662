//! A single log record handed to a formatter

use chrono::{DateTime, Local};

use super::field::Fields;
use super::level::Level;

/// One emitted log entry. Built per call, rendered, then dropped.
#[derive(Debug, Clone)]
pub struct Record {
    /// Time the record was created
    pub time: DateTime<Local>,
    /// Severity
    pub level: Level,
    /// Rendered message
    pub message: String,
    /// Sticky fields merged with any call-site fields
    pub fields: Fields,
}

impl Record {
    /// Create a new record stamped with the current local time
    pub fn new(level: Level, message: impl Into<String>, fields: Fields) -> Self {
        Self {
            time: Local::now(),
            level,
            message: message.into(),
            fields,
        }
    }
}
