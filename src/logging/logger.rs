//! Logger state and logger handles
//!
//! A [`Logger`] owns the settings (threshold, formatter, sink) and the
//! sticky fields. An [`Entry`] is a cheap handle carrying a field set; every
//! record emitted through it includes those fields. The logger keeps one
//! shared entry, rebuilt whenever a sticky field changes.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LogError;

use super::field::{FieldValue, Fields};
use super::formatter::{Formatter, TextFormatter, TIME_FORMAT};
use super::level::Level;
use super::record::Record;
use super::sink::{stderr_sink, stdout_sink, Sink};

/// Message emitted before exiting on an unrecognized threshold
pub const INVALID_LEVEL_MESSAGE: &str =
    "log conf only allow [info, debug, warn], please check your configure";

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Threshold, formatter and sink shared by every handle of one logger
struct Settings {
    level: Level,
    formatter: Arc<dyn Formatter>,
    output: Arc<dyn Sink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: Level::Info,
            formatter: Arc::new(TextFormatter::default()),
            output: stderr_sink(),
        }
    }
}

/// Rendering core referenced by every entry
struct Core {
    settings: RwLock<Settings>,
}

impl Core {
    fn enabled(&self, level: Level) -> bool {
        level >= read(&self.settings).level
    }

    fn emit(&self, record: &Record) {
        // Format and write outside the settings lock
        let (formatter, output) = {
            let settings = read(&self.settings);
            if record.level < settings.level {
                return;
            }
            (Arc::clone(&settings.formatter), Arc::clone(&settings.output))
        };

        let bytes = match formatter.format(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Failed to format log record, {}", e);
                return;
            }
        };

        if let Err(e) = output.write_record(record.level, &bytes) {
            eprintln!("Failed to write to log, {}", e);
        }
    }
}

/// Sticky fields and the shared entry built from them
struct Sticky {
    fields: Fields,
    entry: Entry,
}

/// A logger handle carrying a set of fields
#[derive(Clone)]
pub struct Entry {
    core: Arc<Core>,
    fields: Arc<Fields>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Entry {
    fn new(core: Arc<Core>, fields: Fields) -> Self {
        Self {
            core,
            fields: Arc::new(fields),
        }
    }

    /// Fields carried by this handle
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Derive a handle with one extra field
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Entry {
        let mut fields = (*self.fields).clone();
        fields.insert(key.into(), value.into());
        Entry::new(Arc::clone(&self.core), fields)
    }

    /// Derive a handle with extra fields; supplied keys override existing ones
    pub fn with_fields(&self, extra: Fields) -> Entry {
        let mut fields = (*self.fields).clone();
        fields.extend(extra);
        Entry::new(Arc::clone(&self.core), fields)
    }

    /// Check whether a record at `level` would be written
    pub fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    /// Emit a record at `level`
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if !self.core.enabled(level) {
            return;
        }
        let record = Record::new(level, message.to_string(), (*self.fields).clone());
        self.core.emit(&record);
    }

    /// Emit a record at `level` with a formatted message
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.core.enabled(level) {
            return;
        }
        self.log(level, args);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    /// Emit at info level; kept for callers used to print-style logging
    pub fn println(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    /// Emit at fatal level, then exit the process with status 1
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.log(Level::Fatal, message);
        std::process::exit(1)
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args);
    }

    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args);
    }

    /// Emit a formatted fatal record, then exit the process with status 1
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal(args)
    }
}

struct Inner {
    core: Arc<Core>,
    sticky: RwLock<Sticky>,
}

/// Logger owning settings and sticky fields.
///
/// Cloning is cheap and yields another handle to the same state, so a
/// logger can be passed to components explicitly as well as installed as
/// the process-wide instance.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("fields", &self.fields())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create an unconfigured logger: info threshold, default text
    /// formatter, standard error.
    pub fn new() -> Self {
        let core = Arc::new(Core {
            settings: RwLock::new(Settings::default()),
        });
        let entry = Entry::new(Arc::clone(&core), Fields::new());
        Self {
            inner: Arc::new(Inner {
                core,
                sticky: RwLock::new(Sticky {
                    fields: Fields::new(),
                    entry,
                }),
            }),
        }
    }

    /// Install formatter and output, then set the threshold.
    ///
    /// A missing formatter becomes a [`TextFormatter`] using [`TIME_FORMAT`]
    /// with colors disabled; a missing output becomes standard output. The
    /// formatter and output are installed even when `level` is rejected, so
    /// the caller can report the failure through them.
    pub fn try_init(
        &self,
        level: &str,
        formatter: Option<Arc<dyn Formatter>>,
        output: Option<Arc<dyn Sink>>,
    ) -> Result<(), LogError> {
        let formatter: Arc<dyn Formatter> = match formatter {
            Some(formatter) => formatter,
            None => Arc::new(TextFormatter::with_timestamp_format(TIME_FORMAT)),
        };
        let output = output.unwrap_or_else(stdout_sink);

        let mut settings = write(&self.inner.core.settings);
        settings.formatter = formatter;
        settings.output = output;
        settings.level = Level::parse_threshold(level)?;
        Ok(())
    }

    /// Like [`Logger::try_init`], but an unrecognized level writes a fatal
    /// record and exits the process.
    pub fn init(
        &self,
        level: &str,
        formatter: Option<Arc<dyn Formatter>>,
        output: Option<Arc<dyn Sink>>,
    ) {
        if self.try_init(level, formatter, output).is_err() {
            self.get_logger().fatal(INVALID_LEVEL_MESSAGE);
        }
    }

    /// Current minimum level
    pub fn level(&self) -> Level {
        read(&self.inner.core.settings).level
    }

    /// Change the minimum level without touching formatter or output
    pub fn set_level(&self, level: Level) {
        write(&self.inner.core.settings).level = level;
    }

    /// Insert or overwrite a sticky field and rebuild the shared handle
    pub fn set_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let mut sticky = write(&self.inner.sticky);
        sticky.fields.insert(key.into(), value.into());
        sticky.entry = Entry::new(Arc::clone(&self.inner.core), sticky.fields.clone());
    }

    /// Remove every sticky field and reset the shared handle to a bare one
    pub fn clean(&self) {
        let mut sticky = write(&self.inner.sticky);
        sticky.fields.clear();
        sticky.entry = Entry::new(Arc::clone(&self.inner.core), Fields::new());
    }

    /// Snapshot of the sticky fields
    pub fn fields(&self) -> Fields {
        read(&self.inner.sticky).fields.clone()
    }

    /// Current shared handle carrying the sticky fields
    pub fn get_logger(&self) -> Entry {
        read(&self.inner.sticky).entry.clone()
    }

    /// Derive a handle with one extra field; shared state is untouched
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Entry {
        self.get_logger().with_field(key, value)
    }

    /// Derive a handle with extra fields; shared state is untouched
    pub fn with_fields(&self, fields: Fields) -> Entry {
        self.get_logger().with_fields(fields)
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.get_logger().log(level, message);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.get_logger().trace(message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.get_logger().debug(message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.get_logger().info(message);
    }

    pub fn println(&self, message: impl fmt::Display) {
        self.get_logger().println(message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.get_logger().warn(message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.get_logger().error(message);
    }

    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.get_logger().fatal(message)
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.get_logger().debugf(args);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.get_logger().infof(args);
    }

    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.get_logger().printf(args);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.get_logger().warnf(args);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.get_logger().errorf(args);
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.get_logger().fatalf(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogBuffer;

    fn plain() -> Arc<dyn Formatter> {
        Arc::new(TextFormatter {
            disable_timestamp: true,
            ..TextFormatter::default()
        })
    }

    fn capture(level: &str) -> (Logger, Arc<LogBuffer>) {
        let buffer = Arc::new(LogBuffer::new(1_000, 100));
        let logger = Logger::new();
        logger
            .try_init(level, Some(plain()), Some(buffer.clone()))
            .unwrap();
        (logger, buffer)
    }

    #[test]
    fn test_threshold_warn() {
        let (logger, buffer) = capture("warn");
        logger.debug("x");
        logger.info("x");
        assert!(buffer.is_empty());

        logger.warn("x");
        assert_eq!(buffer.lines(), vec!["level=warning msg=x".to_string()]);
    }

    #[test]
    fn test_threshold_info() {
        let (logger, buffer) = capture("info");
        logger.debug("hidden");
        logger.info("shown");
        logger.error("also shown");
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.contents().contains("hidden"));
    }

    #[test]
    fn test_threshold_debug() {
        let (logger, buffer) = capture("debug");
        logger.trace("hidden");
        logger.debug("shown");
        assert_eq!(buffer.lines(), vec!["level=debug msg=shown".to_string()]);
    }

    #[test]
    fn test_invalid_threshold_keeps_formatter_and_output() {
        let buffer = Arc::new(LogBuffer::new(10, 10));
        let logger = Logger::new();
        let err = logger
            .try_init("error", Some(plain()), Some(buffer.clone()))
            .unwrap_err();
        assert!(matches!(err, LogError::InvalidThreshold(_)));

        logger.info("still routed");
        assert_eq!(buffer.lines(), vec!["level=info msg=\"still routed\"".to_string()]);
    }

    #[test]
    fn test_set_field_appears_in_records() {
        let (logger, buffer) = capture("info");
        logger.set_field("request_id", "abc123");
        logger.info("done");
        assert_eq!(
            buffer.lines(),
            vec!["level=info msg=done request_id=abc123".to_string()]
        );
    }

    #[test]
    fn test_set_field_last_write_wins() {
        let (logger, buffer) = capture("info");
        logger.set_field("user", "alice");
        logger.set_field("user", "bob");
        logger.info("hello");

        let line = buffer.contents();
        assert!(line.contains("user=bob"));
        assert!(!line.contains("user=alice"));
        assert_eq!(logger.fields().len(), 1);
    }

    #[test]
    fn test_with_field_does_not_mutate_shared_state() {
        let (logger, buffer) = capture("info");
        logger.set_field("app", "api");

        let before = logger.get_logger();
        let derived = logger.with_field("k", "v");
        derived.info("derived");
        before.info("before");
        logger.info("shared");

        let lines = buffer.lines();
        assert_eq!(lines[0], "level=info msg=derived app=api k=v");
        assert_eq!(lines[1], "level=info msg=before app=api");
        assert_eq!(lines[2], "level=info msg=shared app=api");
        assert!(!logger.fields().contains_key("k"));
    }

    #[test]
    fn test_with_fields_renders_each_pair_once() {
        let (logger, buffer) = capture("info");
        logger
            .with_fields(crate::fields! { "a" => 1, "b" => 2 })
            .info("pairs");

        let line = buffer.contents();
        assert_eq!(line.matches("a=1").count(), 1);
        assert_eq!(line.matches("b=2").count(), 1);
        assert!(logger.fields().is_empty());
    }

    #[test]
    fn test_handle_sees_later_threshold_change() {
        let (logger, buffer) = capture("info");
        let entry = logger.get_logger();
        logger.set_level(Level::Warn);
        entry.info("filtered");
        assert!(buffer.is_empty());
        assert!(!entry.enabled(Level::Info));
    }

    #[test]
    fn test_clean_clears_sticky_fields() {
        let (logger, buffer) = capture("info");
        logger.set_field("request_id", "abc123");
        logger.clean();
        logger.info("after clean");

        assert!(logger.fields().is_empty());
        assert!(!buffer.contents().contains("request_id"));
    }

    #[test]
    fn test_printf_variants() {
        let (logger, buffer) = capture("debug");
        logger.infof(format_args!("{} items", 3));
        logger.printf(format_args!("{}-{}", "a", "b"));
        logger.debugf(format_args!("dbg {}", 1));
        logger.warnf(format_args!("w"));
        logger.errorf(format_args!("e{}", 2));
        logger.println("plain");

        assert_eq!(
            buffer.lines(),
            vec![
                "level=info msg=\"3 items\"".to_string(),
                "level=info msg=a-b".to_string(),
                "level=debug msg=\"dbg 1\"".to_string(),
                "level=warning msg=w".to_string(),
                "level=error msg=e2".to_string(),
                "level=info msg=plain".to_string(),
            ]
        );
    }

    #[test]
    fn test_concurrent_set_field_keeps_all_keys() {
        let (logger, _buffer) = capture("info");
        let workers = 32;

        std::thread::scope(|scope| {
            for i in 0..workers {
                let logger = logger.clone();
                scope.spawn(move || {
                    logger.set_field(format!("key{}", i), i);
                    logger.info("tick");
                });
            }
        });

        let fields = logger.fields();
        assert_eq!(fields.len(), workers);
        for i in 0..workers {
            assert_eq!(fields[&format!("key{}", i)], FieldValue::from(i));
        }
        assert_eq!(logger.get_logger().fields().len(), workers);
    }

    #[test]
    fn test_uninitialized_logger_defaults() {
        let logger = Logger::new();
        assert_eq!(logger.level(), Level::Info);
        assert!(logger.get_logger().fields().is_empty());
    }
}
