//! Logging types.

use std::sync::Arc;

/// Log level for the tracing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Registration and store writes.
    Debug,
    /// Load and save summaries.
    #[default]
    Info,
    /// Failed loads and skipped entries.
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Application event handler notified when a bulk load fails.
///
/// The callback receives a one-line description of the failure. It is
/// called without any pool lock held, so it may replace itself.
pub type WarningCallback = Arc<dyn Fn(&str) + Send + Sync>;
