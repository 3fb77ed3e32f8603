//! Internal logging system for Sciray Engine
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - A process-wide default logger (owned by `Engine`) and injectable
//!   per-object loggers (`SharedLogger`)
//! - File and line information for detailed ERROR logs

use colored::*;
use std::sync::Arc;
use std::time::SystemTime;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Logger trait for custom logging implementations
///
/// Implement this trait to create custom loggers (file logging, network logging, etc.)
///
/// # Example
///
/// ```no_run
/// use sciray_engine::sciray::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);
}

/// Logger handle injected into core objects (ModelManager, Scene, frame handlers...)
pub type SharedLogger = Arc<dyn Logger>;

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "sciray::ModelManager", "sciray::cpu::Device")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    /// Very verbose debug information (typically disabled in release)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Colors:
/// - Trace: bright_black
/// - Debug: cyan
/// - Info: green
/// - Warn: yellow
/// - Error: red + bold
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
///
/// Entries below `min_severity` are dropped.
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    /// Logger printing everything from Trace upwards
    pub fn new() -> Self {
        Self { min_severity: LogSeverity::Trace }
    }

    /// Logger printing only entries at or above `min_severity`
    pub fn with_min_severity(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    /// Minimum severity printed by this logger
    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }

        // Format timestamp as YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

/// Build a LogEntry and hand it to `logger`
///
/// Used by the engine_* macros when an injected logger is given, and by
/// `Engine::log` for the process-wide logger.
pub fn emit(
    logger: &dyn Logger,
    severity: LogSeverity,
    source: &str,
    message: String,
    location: Option<(&'static str, u32)>,
) {
    logger.log(&LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: location.map(|(file, _)| file),
        line: location.map(|(_, line)| line),
    });
}

// ===== LOGGING MACROS =====
//
// Every macro accepts two forms:
// - `engine_info!("sciray::Source", "fmt", args...)` logs to the process-wide logger
// - `engine_info!(logger, "sciray::Source", "fmt", args...)` logs to an injected
//   `SharedLogger`

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```no_run
/// sciray_engine::engine_trace!("sciray::Engine", "Entering function foo()");
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:literal, $($arg:tt)*) => {
        $crate::sciray::Engine::log(
            $crate::sciray::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
    ($logger:expr, $source:literal, $($arg:tt)*) => {
        $crate::sciray::log::emit(
            ::std::convert::AsRef::<dyn $crate::sciray::log::Logger>::as_ref(&$logger),
            $crate::sciray::log::LogSeverity::Trace,
            $source,
            format!($($arg)*),
            None
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```no_run
/// sciray_engine::engine_debug!("sciray::Engine", "Initialized with {} subsystems", 3);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:literal, $($arg:tt)*) => {
        $crate::sciray::Engine::log(
            $crate::sciray::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
    ($logger:expr, $source:literal, $($arg:tt)*) => {
        $crate::sciray::log::emit(
            ::std::convert::AsRef::<dyn $crate::sciray::log::Logger>::as_ref(&$logger),
            $crate::sciray::log::LogSeverity::Debug,
            $source,
            format!($($arg)*),
            None
        )
    };
}

/// Log an INFO message (important events)
///
/// # Example
///
/// ```no_run
/// sciray_engine::engine_info!("sciray::Engine", "Device created successfully");
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:literal, $($arg:tt)*) => {
        $crate::sciray::Engine::log(
            $crate::sciray::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
    ($logger:expr, $source:literal, $($arg:tt)*) => {
        $crate::sciray::log::emit(
            ::std::convert::AsRef::<dyn $crate::sciray::log::Logger>::as_ref(&$logger),
            $crate::sciray::log::LogSeverity::Info,
            $source,
            format!($($arg)*),
            None
        )
    };
}

/// Log a WARN message (potential issues)
///
/// # Example
///
/// ```no_run
/// sciray_engine::engine_warn!("sciray::Engine", "Backend module {} not available", "ispc");
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:literal, $($arg:tt)*) => {
        $crate::sciray::Engine::log(
            $crate::sciray::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
    ($logger:expr, $source:literal, $($arg:tt)*) => {
        $crate::sciray::log::emit(
            ::std::convert::AsRef::<dyn $crate::sciray::log::Logger>::as_ref(&$logger),
            $crate::sciray::log::LogSeverity::Warn,
            $source,
            format!($($arg)*),
            None
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// sciray_engine::engine_error!("sciray::Engine", "Failed to initialize: {}", "no device");
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:literal, $($arg:tt)*) => {
        $crate::sciray::Engine::log_detailed(
            $crate::sciray::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
    ($logger:expr, $source:literal, $($arg:tt)*) => {
        $crate::sciray::log::emit(
            ::std::convert::AsRef::<dyn $crate::sciray::log::Logger>::as_ref(&$logger),
            $crate::sciray::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            Some((file!(), line!()))
        )
    };
}

/// Build an `Error`, logging it at ERROR severity first
///
/// The variant defaults to `BackendError`; another one can be named
/// with `Variant =>`.
///
/// # Example
///
/// ```no_run
/// use sciray_engine::engine_err;
///
/// let err = engine_err!("sciray::Components", NotFound => "Component '{}' not found", "Geometries");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:literal, $variant:ident => $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::sciray::Error::$variant(message)
    }};
    ($source:literal, $($arg:tt)*) => {
        $crate::engine_err!($source, BackendError => $($arg)*)
    };
}

/// Log and return an `Error` from the current function
///
/// Same forms as `engine_err!`.
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
