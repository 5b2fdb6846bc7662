//! logfacade - process-wide structured logging facade
//!
//! One shared logger with a configurable threshold, formatter and output,
//! sticky fields merged into every record, and leveled helpers in plain and
//! `format!`-style variants.
//!
//! ```no_run
//! logfacade::init("info", None, None);
//! logfacade::set_field("request_id", "abc123");
//! logfacade::info("done");
//! logfacade::infof!("processed {} items", 3);
//! logfacade::with_field("user", "bob").warn("slow request");
//! ```

pub mod config;
pub mod error;
pub mod global;
pub mod logging;

pub use config::{init_from_config, LogConfig, LogFormat};
pub use error::LogError;
pub use global::{
    clean, debug, error, fatal, get_logger, info, init, logger, println, set_field, try_init,
    warn, with_field, with_fields,
};
pub use logging::{
    Entry, FieldValue, Fields, Formatter, JsonFormatter, Level, LogBuffer, Logger, Record, Sink,
    TextFormatter, TIME_FORMAT,
};
