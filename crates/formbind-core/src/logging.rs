//! Structured diagnostics.
//!
//! The processor never writes to a process-wide logger. It reports through
//! an injected [`Diagnostics`] implementation, so applications pick the
//! destination and tests can assert on exactly what was emitted.
//!
//! # Example
//!
//! ```
//! use formbind_core::{Diagnostics, LogConfig, LogEntry, LogLevel, StderrDiagnostics};
//!
//! let diagnostics = StderrDiagnostics::new(LogConfig::new().min_level(LogLevel::Warn));
//! diagnostics.info(
//!     LogEntry::new("upload.empty", "A file field was empty").field("field", "avatar"),
//! );
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that did not fail.
    Warn,
    /// A failure.
    Error,
}

impl LogLevel {
    /// Upper-case label used in plain output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Severity. Set by [`Diagnostics::info`] / [`Diagnostics::error`].
    pub level: LogLevel,
    /// Event identifier, e.g. `upload.stored`.
    pub target: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured context, flattened into the entry's JSON object.
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, Value>,
}

impl LogEntry {
    /// Create an info-level entry.
    #[must_use]
    pub fn new(target: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            target,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a string field.
    #[must_use]
    pub fn field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(key, Value::String(value.into()));
        self
    }

    /// Attach any serializable value as a nested field.
    #[must_use]
    pub fn json_field(mut self, key: &'static str, value: &impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key, value);
        self
    }

    /// Set the level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Look up a string field by key.
    #[must_use]
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Render as a flat JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.target, self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Output configuration for [`StderrDiagnostics`].
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    min_level: LogLevel,
    json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            json: false,
        }
    }
}

impl LogConfig {
    /// Create a config with defaults (info and above, plain text).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries below this level.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Emit one JSON object per line instead of plain text.
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Returns true if entries at `level` pass the filter.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Render an entry according to this config.
    #[must_use]
    pub fn render(&self, entry: &LogEntry) -> String {
        if self.json {
            entry.to_json().to_string()
        } else {
            entry.to_string()
        }
    }
}

/// Destination for processor diagnostics.
pub trait Diagnostics: Send + Sync {
    /// Record an entry as-is.
    fn log(&self, entry: LogEntry);

    /// Record an informational entry.
    fn info(&self, entry: LogEntry) {
        self.log(entry.with_level(LogLevel::Info));
    }

    /// Record an error entry.
    fn error(&self, entry: LogEntry) {
        self.log(entry.with_level(LogLevel::Error));
    }
}

/// Writes entries to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics {
    config: LogConfig,
}

impl StderrDiagnostics {
    /// Create with the given output config.
    #[must_use]
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }
}

impl Diagnostics for StderrDiagnostics {
    fn log(&self, entry: LogEntry) {
        if !self.config.enabled(entry.level) {
            return;
        }
        let line = self.config.render(&entry);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn log(&self, _entry: LogEntry) {}
}
