//! Configuration file support
//!
//! A `LogConfig` describes the threshold, formatter, output and startup
//! fields of a logger in TOML:
//!
//! ```toml
//! level = "debug"
//! format = "json"
//! output = "~/.myapp/logs/app.log"
//!
//! [fields]
//! service = "billing"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::global;
use crate::logging::{
    open_file_sink, stderr_sink, stdout_sink, FieldValue, Fields, Formatter, JsonFormatter,
    Level, Logger, Sink, TextFormatter, TIME_FORMAT,
};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `key=value` text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level: "info" (default), "debug" or "warn"
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format (default: text)
    #[serde(default)]
    pub format: LogFormat,

    /// "stdout" (default), "stderr", or a file path (`~` is expanded)
    #[serde(default = "default_output")]
    pub output: String,

    /// chrono timestamp pattern; text output defaults to `TIME_FORMAT`,
    /// JSON output to RFC 3339
    #[serde(default)]
    pub timestamp_format: Option<String>,

    /// `tracing` filter directives for the bridge; no bridge when unset
    #[serde(default)]
    pub tracing: Option<String>,

    /// Sticky fields installed at startup
    #[serde(default)]
    pub fields: BTreeMap<String, toml::Value>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_output() -> String {
    "stdout".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            output: default_output(),
            timestamp_format: None,
            tracing: None,
            fields: BTreeMap::new(),
        }
    }
}

impl LogConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse log config")
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read log config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Build the configured formatter
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        match self.format {
            LogFormat::Text => Arc::new(TextFormatter::with_timestamp_format(
                self.timestamp_format.as_deref().unwrap_or(TIME_FORMAT),
            )),
            LogFormat::Json => Arc::new(JsonFormatter {
                timestamp_format: self.timestamp_format.clone(),
                ..JsonFormatter::default()
            }),
        }
    }

    /// Resolve the output setting to a file path, if it names one
    pub fn output_path(&self) -> Option<PathBuf> {
        match self.output.as_str() {
            "stdout" | "stderr" => None,
            path => Some(PathBuf::from(shellexpand::tilde(path).into_owned())),
        }
    }

    /// Open the configured sink
    pub fn sink(&self) -> Result<Arc<dyn Sink>> {
        match self.output.as_str() {
            "stdout" => Ok(stdout_sink()),
            "stderr" => Ok(stderr_sink()),
            _ => {
                let path = self.output_path().context("Missing log output path")?;
                open_file_sink(&path)
            }
        }
    }

    /// Startup fields converted to field values
    pub fn sticky_fields(&self) -> Fields {
        self.fields
            .iter()
            .map(|(key, value)| (key.clone(), field_value(value)))
            .collect()
    }

    /// Configure `logger` from this configuration.
    ///
    /// Unlike [`Logger::init`], an invalid level is returned as an error.
    /// The level is checked before the output is opened, so a rejected
    /// config creates no file and leaves `logger` untouched.
    pub fn apply(&self, logger: &Logger) -> Result<()> {
        Level::parse_threshold(&self.level).context("Invalid log level in config")?;

        let sink = self.sink()?;
        logger
            .try_init(&self.level, Some(self.formatter()), Some(sink))
            .context("Invalid log level in config")?;

        for (key, value) in self.sticky_fields() {
            logger.set_field(key, value);
        }
        Ok(())
    }
}

/// Convert a TOML value to a field value
fn field_value(value: &toml::Value) -> FieldValue {
    match value {
        toml::Value::String(s) => FieldValue::Str(s.clone()),
        toml::Value::Integer(n) => FieldValue::Int(*n),
        toml::Value::Float(n) => FieldValue::Float(*n),
        toml::Value::Boolean(b) => FieldValue::Bool(*b),
        toml::Value::Datetime(dt) => FieldValue::Str(dt.to_string()),
        toml::Value::Array(_) => FieldValue::Str(value.to_string()),
        toml::Value::Table(table) => FieldValue::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), field_value(v)))
                .collect(),
        ),
    }
}

/// Configure the process-wide logger from a configuration
pub fn init_from_config(config: &LogConfig) -> Result<()> {
    config.apply(global::logger())
}
