//! Leveled progress logging.
//!
//! Pipeline code reports progress with `log_info`, `log_success` and
//! `log_warning`. Entries go through the `log` facade, so the
//! binary decides where they end up (`env_logger` on stdout by default).

use std::fmt;

/// Log level for progress output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠️ ",
        }
    }

    fn facade_level(self) -> log::Level {
        match self {
            LogLevel::Info | LogLevel::Success => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as three spaces per level
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "   ".repeat(self.indent as usize);
        write!(f, "{}{}{}", indent, self.level.prefix(), self.message)
    }
}

/// Emit an entry through the `log` facade.
pub fn log_entry(entry: LogEntry) {
    log::log!(target: "extratos", entry.level.facade_level(), "{}", entry);
}

pub fn log_info(msg: impl Into<String>) {
    log_entry(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    log_entry(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    log_entry(LogEntry::warning(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    log_entry(LogEntry::info(msg).with_indent(indent));
}

pub fn log_success_indent(msg: impl Into<String>, indent: u8) {
    log_entry(LogEntry::success(msg).with_indent(indent));
}
