//! Test doubles for exercising the processor.
//!
//! - [`CapturingDiagnostics`] records every entry for assertions
//! - [`FailingItem`] is a file item whose write always fails
//! - [`TestItem`] mixes good and failing items in one batch
//! - [`RejectingSink`] refuses every parameter and attribute write

use parking_lot::Mutex;
use std::any::Any;
use std::io::Write;
use std::sync::Arc;

use crate::error::SinkError;
use crate::item::{DecodedItem, Part};
use crate::logging::{Diagnostics, LogEntry, LogLevel};
use crate::sink::{AttributeSink, ParameterSink};

/// Diagnostics that keep every entry in memory.
///
/// Clones share the same buffer, so hand one clone to the processor and
/// assert on another.
#[derive(Debug, Clone, Default)]
pub struct CapturingDiagnostics {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CapturingDiagnostics {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Entries with the given target.
    #[must_use]
    pub fn entries_for(&self, target: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.target == target)
            .cloned()
            .collect()
    }

    /// Error-level entries.
    #[must_use]
    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == LogLevel::Error)
            .cloned()
            .collect()
    }

    /// Discard captured entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Diagnostics for CapturingDiagnostics {
    fn log(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}

/// A file item that writes a few bytes and then fails.
#[derive(Debug, Clone)]
pub struct FailingItem {
    part: Part,
}

impl FailingItem {
    /// A failing file item with content type `application/octet-stream`.
    #[must_use]
    pub fn new(field_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::from_part(Part::file(
            field_name,
            file_name,
            "application/octet-stream",
            b"partial".to_vec(),
        ))
    }

    /// Wrap a part so that writing it fails.
    #[must_use]
    pub fn from_part(part: Part) -> Self {
        Self { part }
    }
}

impl DecodedItem for FailingItem {
    fn is_form_field(&self) -> bool {
        self.part.is_form_field()
    }

    fn field_name(&self) -> &str {
        self.part.field_name()
    }

    fn value(&self) -> String {
        self.part.value()
    }

    fn file_name(&self) -> &str {
        self.part.file_name()
    }

    fn content_type(&self) -> Option<&str> {
        self.part.content_type.as_deref()
    }

    fn write_to<W: Write>(self, dest: &mut W) -> std::io::Result<()> {
        dest.write_all(&self.part.data)?;
        Err(std::io::Error::other("simulated write failure"))
    }
}

/// Either a regular part or one whose write fails.
#[derive(Debug, Clone)]
pub enum TestItem {
    /// Behaves like the wrapped part.
    Ok(Part),
    /// Fails on write.
    Failing(FailingItem),
}

impl From<Part> for TestItem {
    fn from(part: Part) -> Self {
        Self::Ok(part)
    }
}

impl From<FailingItem> for TestItem {
    fn from(item: FailingItem) -> Self {
        Self::Failing(item)
    }
}

impl DecodedItem for TestItem {
    fn is_form_field(&self) -> bool {
        match self {
            Self::Ok(part) => part.is_form_field(),
            Self::Failing(item) => item.is_form_field(),
        }
    }

    fn field_name(&self) -> &str {
        match self {
            Self::Ok(part) => part.field_name(),
            Self::Failing(item) => item.field_name(),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Ok(part) => part.value(),
            Self::Failing(item) => item.value(),
        }
    }

    fn file_name(&self) -> &str {
        match self {
            Self::Ok(part) => part.file_name(),
            Self::Failing(item) => item.file_name(),
        }
    }

    fn content_type(&self) -> Option<&str> {
        match self {
            Self::Ok(part) => DecodedItem::content_type(part),
            Self::Failing(item) => item.content_type(),
        }
    }

    fn write_to<W: Write>(self, dest: &mut W) -> std::io::Result<()> {
        match self {
            Self::Ok(part) => part.write_to(dest),
            Self::Failing(item) => item.write_to(dest),
        }
    }
}

/// A sink that rejects every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingSink;

impl ParameterSink for RejectingSink {
    fn set_parameter(&mut self, name: &str, _values: Vec<String>) -> Result<(), SinkError> {
        Err(SinkError::new("parameters", format!("parameter {name} rejected")))
    }
}

impl AttributeSink for RejectingSink {
    fn set_attribute(
        &mut self,
        key: String,
        _value: Box<dyn Any + Send + Sync>,
    ) -> Result<(), SinkError> {
        Err(SinkError::new("attributes", format!("attribute {key} rejected")))
    }
}
