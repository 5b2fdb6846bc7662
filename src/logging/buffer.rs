//! In-memory log buffer
//!
//! A bounded, thread-safe sink that keeps the most recent rendered records,
//! plus a separate ring of warning-and-worse records.

use std::collections::VecDeque;
use std::io;
use std::sync::RwLock;

use super::level::Level;
use super::sink::Sink;

/// Thread-safe ring buffer of rendered log lines
pub struct LogBuffer {
    /// All lines (capped at max_lines)
    lines: RwLock<VecDeque<String>>,
    /// Lines rendered at warning level or above
    alerts: RwLock<VecDeque<String>>,
    /// Maximum lines to keep in the main buffer
    max_lines: usize,
    /// Maximum alerts to keep
    max_alerts: usize,
}

impl LogBuffer {
    /// Create a new log buffer with specified capacities
    pub fn new(max_lines: usize, max_alerts: usize) -> Self {
        Self {
            lines: RwLock::new(VecDeque::with_capacity(max_lines)),
            alerts: RwLock::new(VecDeque::with_capacity(max_alerts)),
            max_lines,
            max_alerts,
        }
    }

    /// Push a rendered record to the buffer
    pub fn push(&self, level: Level, line: String) {
        // Add to alerts buffer if warning or worse
        if level.is_alert() {
            if let Ok(mut alerts) = self.alerts.write() {
                if alerts.len() >= self.max_alerts {
                    alerts.pop_front();
                }
                alerts.push_back(line.clone());
            }
        }

        if let Ok(mut lines) = self.lines.write() {
            if lines.len() >= self.max_lines {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// Get all lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .read()
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get all lines joined with newlines
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// Get the number of lines in the buffer
    pub fn len(&self) -> usize {
        self.lines.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get buffered warning, error and fatal lines
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .read()
            .map(|a| a.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every buffered line and alert
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.write() {
            lines.clear();
        }
        if let Ok(mut alerts) = self.alerts.write() {
            alerts.clear();
        }
    }
}

impl Sink for LogBuffer {
    /// Raw bytes carry no level; each non-empty line is kept as info
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.push(Level::Info, line.to_string());
        }
        Ok(())
    }

    /// One record is one entry, even when the formatter spans several lines
    fn write_record(&self, level: Level, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches('\n');
        if !text.trim().is_empty() {
            self.push(level, text.to_string());
        }
        Ok(())
    }
}
