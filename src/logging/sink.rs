//! Turn a reconciled configuration into an installed logger
//!
//! Each handler becomes an `env_logger` logger with its own level filter,
//! output target and format. [`DispatchLogger`] forwards every record to
//! all of them.

use super::config::{HandlerDescription, LoggingConfigDescription, LoggingConfigError};
use env_logger::fmt::Formatter;
use env_logger::{Builder, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};
use mcuprog_core::LogLevel;
use std::fs::OpenOptions;
use std::io::Write;

/// Format used by handlers without a formatter
pub const DEFAULT_FORMAT: &str = "{level} - {message}";

/// Map a verbosity level onto the `log` crate's filter
///
/// `log` has no level above error, so `Critical` silences everything.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Warning => LevelFilter::Warn,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Critical => LevelFilter::Off,
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Expand a format pattern for one record
///
/// `{message}` is substituted last so that braces in the message text are
/// left alone.
pub fn render(pattern: &str, time: &str, record: &Record) -> String {
    pattern
        .replace("{time}", time)
        .replace("{level}", level_name(record.level()))
        .replace("{target}", record.target())
        .replace("{module}", record.module_path().unwrap_or(""))
        .replace("{file}", record.file().unwrap_or(""))
        .replace("{line}", &record.line().map(|l| l.to_string()).unwrap_or_default())
        .replace("{message}", &record.args().to_string())
}

/// Logger that fans each record out to several handlers
pub struct DispatchLogger {
    sinks: Vec<env_logger::Logger>,
}

impl DispatchLogger {
    /// Number of attached handlers
    pub fn handler_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Log for DispatchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.sinks.iter().any(|s| s.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for sink in &self.sinks {
            if sink.matches(record) {
                sink.log(record);
            }
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

/// Build the logger for a reconciled configuration
///
/// Handlers listed on the root logger are attached; when the root names no
/// handlers, every handler is.
pub fn build_logger(config: &LoggingConfigDescription) -> Result<DispatchLogger, LoggingConfigError> {
    let handlers = config
        .handlers
        .as_ref()
        .ok_or_else(|| LoggingConfigError::missing_key("handlers"))?;
    let names: Vec<&String> = match config.root.as_ref().and_then(|r| r.handlers.as_ref()) {
        Some(names) => names.iter().collect(),
        None => handlers.keys().collect(),
    };

    let mut sinks = Vec::with_capacity(names.len());
    for name in names {
        let handler = handlers
            .get(name)
            .ok_or_else(|| LoggingConfigError::missing_key(name))?;
        let pattern = match &handler.formatter {
            Some(formatter) => config
                .formatters
                .get(formatter)
                .ok_or_else(|| LoggingConfigError::missing_key(formatter))?
                .format
                .clone(),
            None => DEFAULT_FORMAT.to_string(),
        };
        sinks.push(build_sink(handler, pattern)?);
    }

    Ok(DispatchLogger { sinks })
}

fn build_sink(
    handler: &HandlerDescription,
    pattern: String,
) -> Result<env_logger::Logger, LoggingConfigError> {
    let mut builder = Builder::new();
    let level = handler.level.map(level_filter).unwrap_or(LevelFilter::Trace);
    builder.filter_level(level);

    match &handler.filename {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingConfigError::OpenLogFile {
                    path: path.clone(),
                    source,
                })?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        None => {
            let target = match handler.stream.as_deref() {
                Some("stdout") | Some("ext://sys.stdout") => Target::Stdout,
                _ => Target::Stderr,
            };
            builder.target(target);
        }
    }

    builder.format(move |buf: &mut Formatter, record: &Record| {
        let time = buf.timestamp().to_string();
        writeln!(buf, "{}", render(&pattern, &time, record))
    });

    Ok(builder.build())
}

/// Install `logger` as the process logger with `root` as the global filter
///
/// A logger that is already installed is left in place.
pub fn install(logger: DispatchLogger, root: LogLevel) {
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level_filter(root));
    }
}

/// Install plain console logging at `level`
pub fn install_basic(level: LogLevel) {
    let _ = Builder::new()
        .filter_level(level_filter(level))
        .format(|buf: &mut Formatter, record: &Record| {
            let time = buf.timestamp().to_string();
            writeln!(buf, "{}", render(DEFAULT_FORMAT, &time, record))
        })
        .try_init();
}
