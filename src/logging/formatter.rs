//! Record formatters
//!
//! A [`Formatter`] turns a [`Record`] into the bytes written to a sink. Two
//! formatters ship with the crate: [`TextFormatter`] (logfmt-style
//! `key=value` lines) and [`JsonFormatter`] (one JSON object per line).

use std::fmt::Write as _;

use chrono::{DateTime, Offset, SecondsFormat, TimeZone};
use serde_json::{Map, Value};

use crate::error::LogError;

use super::field::Fields;
use super::record::Record;

/// Timestamp pattern installed by `init` when no formatter is given.
///
/// Renders as `2006-01-02 15:04:05.000 +0800`, or with a bare `Z` zone
/// when the local offset is zero.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f Z%z";

/// Keys written by the formatters themselves
const KEY_TIME: &str = "time";
const KEY_LEVEL: &str = "level";
const KEY_MSG: &str = "msg";

/// Renders a record to bytes
pub trait Formatter: Send + Sync {
    /// Render one record, including the trailing newline
    fn format(&self, record: &Record) -> Result<Vec<u8>, LogError>;
}

/// Render a timestamp with a chrono pattern, or RFC 3339 when none is set.
///
/// The sequence `Z%z` renders as `Z` for a zero offset and as the numeric
/// offset otherwise. Invalid patterns fall back to RFC 3339.
fn render_time<Tz: TimeZone>(time: &DateTime<Tz>, pattern: Option<&str>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(pattern) = pattern else {
        return time.to_rfc3339_opts(SecondsFormat::Secs, true);
    };

    let pattern = if time.offset().fix().local_minus_utc() == 0 {
        pattern.replace("Z%z", "Z")
    } else {
        pattern.replace("Z%z", "%z")
    };

    let mut out = String::new();
    if write!(out, "{}", time.format(&pattern)).is_err() {
        return time.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

/// Move user fields whose names collide with the formatter's own keys
/// to `fields.<key>` so neither value is lost.
fn resolve_clashes(fields: &Fields) -> Fields {
    let mut resolved = fields.clone();
    for key in [KEY_TIME, KEY_MSG, KEY_LEVEL] {
        if let Some(value) = resolved.remove(key) {
            resolved.insert(format!("fields.{}", key), value);
        }
    }
    resolved
}

/// Plain text formatter producing `key=value` pairs
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// chrono pattern for the `time` key; RFC 3339 when `None`
    pub timestamp_format: Option<String>,
    /// Omit the `time` key entirely
    pub disable_timestamp: bool,
    /// Color the level value with ANSI escapes
    pub force_colors: bool,
    /// Never emit ANSI escapes, even when `force_colors` is set
    pub disable_colors: bool,
    /// Quote empty string values as `""`
    pub quote_empty_fields: bool,
}

impl TextFormatter {
    /// Create a text formatter with the given timestamp pattern and colors disabled
    pub fn with_timestamp_format(pattern: impl Into<String>) -> Self {
        Self {
            timestamp_format: Some(pattern.into()),
            disable_colors: true,
            ..Self::default()
        }
    }

    fn colors_enabled(&self) -> bool {
        self.force_colors && !self.disable_colors
    }

    fn needs_quoting(&self, text: &str) -> bool {
        if text.is_empty() {
            return self.quote_empty_fields;
        }
        !text.chars().all(|ch| {
            ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '/' | '@' | '^' | '+')
        })
    }

    fn append_pair(&self, out: &mut String, key: &str, value: &str) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        self.append_value(out, value);
    }

    fn append_value(&self, out: &mut String, value: &str) {
        if self.needs_quoting(value) {
            let _ = write!(out, "{:?}", value);
        } else {
            out.push_str(value);
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>, LogError> {
        let mut out = String::new();

        if !self.disable_timestamp {
            let time = render_time(&record.time, self.timestamp_format.as_deref());
            self.append_pair(&mut out, KEY_TIME, &time);
        }

        if self.colors_enabled() {
            let level = format!(
                "\x1b[{}m{}\x1b[0m",
                record.level.color_code(),
                record.level.as_str()
            );
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", KEY_LEVEL, level);
        } else {
            self.append_pair(&mut out, KEY_LEVEL, record.level.as_str());
        }

        if !record.message.is_empty() {
            self.append_pair(&mut out, KEY_MSG, &record.message);
        }

        for (key, value) in resolve_clashes(&record.fields) {
            self.append_pair(&mut out, &key, &value.to_string());
        }

        out.push('\n');
        Ok(out.into_bytes())
    }
}

/// JSON formatter producing one object per line
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// chrono pattern for the `time` key; RFC 3339 when `None`
    pub timestamp_format: Option<String>,
    /// Omit the `time` key entirely
    pub disable_timestamp: bool,
    /// Indent the output
    pub pretty_print: bool,
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>, LogError> {
        let mut data = Map::new();
        for (key, value) in resolve_clashes(&record.fields) {
            data.insert(key, serde_json::to_value(&value)?);
        }

        if !self.disable_timestamp {
            let time = render_time(&record.time, self.timestamp_format.as_deref());
            data.insert(KEY_TIME.to_string(), Value::String(time));
        }
        data.insert(KEY_LEVEL.to_string(), serde_json::to_value(record.level)?);
        data.insert(KEY_MSG.to_string(), Value::String(record.message.clone()));

        let object = Value::Object(data);
        let mut out = if self.pretty_print {
            serde_json::to_vec_pretty(&object)?
        } else {
            serde_json::to_vec(&object)?
        };
        out.push(b'\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Level;
    use chrono::{FixedOffset, Utc};

    fn render(formatter: &dyn Formatter, record: &Record) -> String {
        String::from_utf8(formatter.format(record).unwrap()).unwrap()
    }

    fn plain() -> TextFormatter {
        TextFormatter {
            disable_timestamp: true,
            ..TextFormatter::default()
        }
    }

    #[test]
    fn test_text_basic_line() {
        let record = Record::new(Level::Info, "done", crate::fields! { "request_id" => "abc123" });
        assert_eq!(
            render(&plain(), &record),
            "level=info msg=done request_id=abc123\n"
        );
    }

    #[test]
    fn test_text_quotes_values_with_spaces() {
        let record = Record::new(Level::Warn, "disk almost full", crate::fields! { "path" => "/var/log" });
        assert_eq!(
            render(&plain(), &record),
            "level=warning msg=\"disk almost full\" path=/var/log\n"
        );
    }

    #[test]
    fn test_text_empty_values() {
        let record = Record::new(Level::Info, "", crate::fields! { "empty" => "" });
        assert_eq!(render(&plain(), &record), "level=info empty=\n");

        let quoting = TextFormatter {
            quote_empty_fields: true,
            ..plain()
        };
        assert_eq!(render(&quoting, &record), "level=info empty=\"\"\n");
    }

    #[test]
    fn test_text_fields_rendered_once_each() {
        let record = Record::new(Level::Info, "x", crate::fields! { "b" => 2, "a" => 1 });
        let line = render(&plain(), &record);
        assert_eq!(line.matches("a=1").count(), 1);
        assert_eq!(line.matches("b=2").count(), 1);
    }

    #[test]
    fn test_text_reserved_key_clash() {
        let record = Record::new(
            Level::Error,
            "boom",
            crate::fields! { "msg" => "user", "level" => "custom" },
        );
        assert_eq!(
            render(&plain(), &record),
            "level=error msg=boom fields.level=custom fields.msg=user\n"
        );
    }

    #[test]
    fn test_text_colors() {
        let record = Record::new(Level::Error, "x", Fields::new());
        let colored = TextFormatter {
            force_colors: true,
            ..plain()
        };
        assert!(render(&colored, &record).contains("\x1b[31merror\x1b[0m"));

        let disabled = TextFormatter {
            force_colors: true,
            disable_colors: true,
            ..plain()
        };
        assert!(!render(&disabled, &record).contains('\x1b'));
    }

    #[test]
    fn test_render_time_numeric_offset() {
        let east = FixedOffset::east_opt(8 * 3600).unwrap();
        let time = east.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(
            render_time(&time, Some(TIME_FORMAT)),
            "2024-03-01 12:30:45.000 +0800"
        );

        let west = FixedOffset::west_opt(5 * 3600 + 1800).unwrap();
        let time = west.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(
            render_time(&time, Some(TIME_FORMAT)),
            "2024-03-01 12:30:45.000 -0530"
        );
    }

    #[test]
    fn test_render_time_zero_offset_uses_z() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(
            render_time(&time, Some(TIME_FORMAT)),
            "2024-03-01 12:30:45.000 Z"
        );
    }

    #[test]
    fn test_render_time_rfc3339_default() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(render_time(&time, None), "2024-03-01T12:30:45Z");
    }

    #[test]
    fn test_text_timestamp_is_quoted() {
        let formatter = TextFormatter::with_timestamp_format(TIME_FORMAT);
        let record = Record::new(Level::Info, "hi", Fields::new());
        let line = render(&formatter, &record);
        assert!(line.starts_with("time=\""));
        assert!(line.contains("\" level=info msg=hi"));
    }

    #[test]
    fn test_json_output() {
        let formatter = JsonFormatter {
            disable_timestamp: true,
            ..JsonFormatter::default()
        };
        let record = Record::new(
            Level::Warn,
            "slow",
            crate::fields! { "ms" => 1500, "msg" => "clash" },
        );
        let line = render(&formatter, &record);
        assert!(line.ends_with('\n'));
        let value: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["msg"], "slow");
        assert_eq!(value["ms"], 1500);
        assert_eq!(value["fields.msg"], "clash");
        assert!(value.get("time").is_none());
    }

    #[test]
    fn test_json_nested_map() {
        let formatter = JsonFormatter::default();
        let record = Record::new(
            Level::Info,
            "nested",
            crate::fields! { "user" => crate::fields! { "id" => 7, "admin" => true } },
        );
        let value: Value = serde_json::from_str(render(&formatter, &record).trim()).unwrap();
        assert_eq!(value["user"]["id"], 7);
        assert_eq!(value["user"]["admin"], true);
        assert!(value["time"].is_string());
    }
}
