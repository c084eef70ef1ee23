//! Host-side logging bridge.
//!
//! The core logs through the `log` facade; the host supplies a [`Logger`]
//! once at startup and receives every record. Debug and trace records are
//! forwarded only when they originate from this crate's modules.

use std::sync::{Arc, OnceLock};

/// Receives log records from the core.
///
/// Implemented by the host (e.g. bridged to the platform's unified logging)
/// and installed once via [`set_logger`].
#[uniffi::export(with_foreign)]
pub trait Logger: Send + Sync {
    /// Handles one log record.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Extremely detailed diagnostics.
    Trace,
    /// Debugging information.
    Debug,
    /// Progress of normal operation.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Errors that may still allow the application to continue.
    Error,
}

const fn from_log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// `log::Log` implementation forwarding records to the host's [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let from_this_crate = record
            .module_path()
            .is_some_and(|path| path.starts_with("mobilitykit"));
        let low_priority = matches!(record.level(), log::Level::Debug | log::Level::Trace);
        if low_priority && !from_this_crate {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(from_log_level(record.level()), record.args().to_string());
        } else {
            eprintln!("logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the host's logger and activates the bridge. Call once at
/// startup, before any other core API; a second call is ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        log::warn!("logger already set");
        return;
    }

    static LOGGER: ForeignLogger = ForeignLogger;
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
