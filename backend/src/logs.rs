//! Console status lines for a load run.
//!
//! Everything the loader reports goes through the process-wide [`RUN_LOG`],
//! which prints to stdout and keeps warning/error tallies for the summary.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Log level of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single status line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth (one step = three spaces)
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

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the line as printed on the console.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "  ✅",
            LogLevel::Warning => "  ⚠️",
            LogLevel::Error => "  ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global run log
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

/// Prints status lines and counts the ones that need attention.
pub struct RunLog {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }

    pub fn log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Warning => {
                self.warnings.fetch_add(1, Ordering::Relaxed);
            }
            LogLevel::Error => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
            LogLevel::Info | LogLevel::Success => {}
        }
        println!("{}", entry.render());
    }

    /// Number of warnings logged so far.
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Number of errors logged so far.
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a stage heading (blank line first, no prefix).
pub fn log_stage(msg: impl Into<String>) {
    println!("\n{}", msg.into());
}

pub fn log_info(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::error(msg));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.log(LogEntry::warning(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefixes() {
        assert_eq!(LogEntry::info("hola").render(), "   hola");
        assert!(LogEntry::error("mal").render().contains("❌ mal"));
        assert!(LogEntry::warning("x").with_indent(1).render().starts_with("     ⚠️"));
    }

    #[test]
    fn test_counts_warnings_and_errors() {
        let log = RunLog::new();
        log.log(LogEntry::info("a"));
        log.log(LogEntry::warning("b"));
        log.log(LogEntry::warning("c"));
        log.log(LogEntry::error("d"));
        assert_eq!(log.warnings(), 2);
        assert_eq!(log.errors(), 1);
    }
}
