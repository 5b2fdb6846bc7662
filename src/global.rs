//! Process-wide logger
//!
//! One lazily created [`Logger`] shared by the whole process, with free
//! functions mirroring its methods. Call [`init`] once at startup; emits
//! before that go through the unconfigured defaults (info threshold, text
//! formatter, standard error).

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::LogError;
use crate::logging::{Entry, FieldValue, Fields, Formatter, Logger, Sink};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Get the process-wide logger
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::new)
}

/// Configure the process-wide logger.
///
/// `level` must be `info`, `debug` or `warn`; anything else writes a fatal
/// record through the installed formatter and output, then exits with
/// status 1.
pub fn init(level: &str, formatter: Option<Arc<dyn Formatter>>, output: Option<Arc<dyn Sink>>) {
    logger().init(level, formatter, output);
}

/// Configure the process-wide logger, reporting an invalid level instead of exiting
pub fn try_init(
    level: &str,
    formatter: Option<Arc<dyn Formatter>>,
    output: Option<Arc<dyn Sink>>,
) -> Result<(), LogError> {
    logger().try_init(level, formatter, output)
}

/// Add or overwrite a field included in every later record
pub fn set_field(key: impl Into<String>, value: impl Into<FieldValue>) {
    logger().set_field(key, value);
}

/// Current shared handle, for chaining one-off fields
pub fn get_logger() -> Entry {
    logger().get_logger()
}

pub fn with_field(key: impl Into<String>, value: impl Into<FieldValue>) -> Entry {
    logger().with_field(key, value)
}

pub fn with_fields(fields: Fields) -> Entry {
    logger().with_fields(fields)
}

/// Remove every sticky field
pub fn clean() {
    logger().clean();
}

pub fn println(message: impl fmt::Display) {
    logger().println(message);
}

pub fn info(message: impl fmt::Display) {
    logger().info(message);
}

pub fn warn(message: impl fmt::Display) {
    logger().warn(message);
}

pub fn error(message: impl fmt::Display) {
    logger().error(message);
}

pub fn debug(message: impl fmt::Display) {
    logger().debug(message);
}

/// Write a fatal record, then exit with status 1
pub fn fatal(message: impl fmt::Display) -> ! {
    logger().fatal(message)
}

pub fn printf(args: fmt::Arguments<'_>) {
    logger().printf(args);
}

pub fn infof(args: fmt::Arguments<'_>) {
    logger().infof(args);
}

pub fn warnf(args: fmt::Arguments<'_>) {
    logger().warnf(args);
}

pub fn errorf(args: fmt::Arguments<'_>) {
    logger().errorf(args);
}

pub fn debugf(args: fmt::Arguments<'_>) {
    logger().debugf(args);
}

pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    logger().fatalf(args)
}

/// Info-level record with a `format!`-style message
#[macro_export]
macro_rules! printf {
    ($($arg:tt)+) => { $crate::global::printf(format_args!($($arg)+)) };
}

/// Info-level record with a `format!`-style message
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => { $crate::global::infof(format_args!($($arg)+)) };
}

/// Warning record with a `format!`-style message
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => { $crate::global::warnf(format_args!($($arg)+)) };
}

/// Error record with a `format!`-style message
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => { $crate::global::errorf(format_args!($($arg)+)) };
}

/// Debug record with a `format!`-style message
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => { $crate::global::debugf(format_args!($($arg)+)) };
}

/// Fatal record with a `format!`-style message, then exit with status 1
#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => { $crate::global::fatalf(format_args!($($arg)+)) };
}
