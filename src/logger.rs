//! Custom logging module.
//!
//! This module provides a custom logger implementation that formats log
//! entries and writes them to stderr, keeping stdout free for command output.

use crate::error::{AppError, AppResult};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Custom logger writing formatted records to stderr
///
pub struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    pub fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            // Nowhere left to report a failed write
            let _ = writeln!(stderr, "{}", format_log(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger as the global `log` backend.
///
pub fn init(level: LevelFilter) -> AppResult<()> {
    let logger: &'static CustomLogger = Box::leak(Box::new(CustomLogger::new(level)));
    log::set_logger(logger)
        .map_err(|e| AppError::Logger(e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}
