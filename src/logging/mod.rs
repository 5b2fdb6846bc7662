//! Logging core
//!
//! Levels, field values, formatters, sinks and the [`Logger`] that ties them
//! together, plus a bridge that routes `tracing` events into a logger.

mod bridge;
mod buffer;
mod field;
mod formatter;
mod level;
mod logger;
mod record;
mod sink;

pub use bridge::{install_tracing_bridge, FacadeLayer};
pub use buffer::LogBuffer;
pub use field::{FieldValue, Fields};
pub use formatter::{Formatter, JsonFormatter, TextFormatter, TIME_FORMAT};
pub use level::Level;
pub use logger::{Entry, Logger, INVALID_LEVEL_MESSAGE};
pub use record::Record;
pub use sink::{open_file_sink, stderr_sink, stdout_sink, Sink, WriterSink};
