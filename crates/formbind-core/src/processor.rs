//! Multipart item processing.
//!
//! [`UploadProcessor::process`] walks decoded items in order:
//! - form fields become single-value parameters;
//! - file fields with a file name are materialized to a temp file, exposed
//!   as a parameter holding the file's absolute path, and stored as an
//!   [`UploadedFile`] attribute keyed by that same path;
//! - file fields without a file name are skipped.
//!
//! A failed materialization is logged and recorded in the returned
//! [`ProcessReport`], and processing moves on to the next item. Only sink
//! failures abort the call.

use std::sync::Arc;

use crate::cleanup::CleanupRegistry;
use crate::config::UploadConfig;
use crate::error::{SinkError, UploadError};
use crate::item::DecodedItem;
use crate::logging::{Diagnostics, LogEntry, StderrDiagnostics};
use crate::sink::{AttributeSink, ParameterSink};
use crate::upload::{UploadedFile, materialize};

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Form field recorded as a parameter.
    Field { name: String },
    /// File persisted and recorded in both sinks.
    Stored {
        field_name: String,
        file: UploadedFile,
    },
    /// File field submitted without a file.
    Skipped { field_name: String },
    /// File could not be persisted; nothing was recorded.
    Failed {
        field_name: String,
        file_name: String,
        error: UploadError,
    },
}

impl ItemOutcome {
    /// The item's field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::Field { name } => name,
            Self::Stored { field_name, .. }
            | Self::Skipped { field_name }
            | Self::Failed { field_name, .. } => field_name,
        }
    }
}

/// Per-item outcomes of one [`UploadProcessor::process`] call, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    outcomes: Vec<ItemOutcome>,
}

impl ProcessReport {
    /// All outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Descriptors of every stored file.
    #[must_use]
    pub fn stored(&self) -> Vec<&UploadedFile> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Stored { file, .. } => Some(file),
                _ => None,
            })
            .collect()
    }

    /// `(field name, error)` for every failed item.
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &UploadError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Failed {
                    field_name, error, ..
                } => Some((field_name.as_str(), error)),
                _ => None,
            })
            .collect()
    }

    /// Field names whose upload failed.
    #[must_use]
    pub fn failed_fields(&self) -> Vec<&str> {
        self.failures().into_iter().map(|(name, _)| name).collect()
    }

    /// Returns true if no item failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|outcome| matches!(outcome, ItemOutcome::Failed { .. }))
    }

    /// Returns the number of processed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if no items were processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Processes decoded multipart items into parameter and attribute sinks.
///
/// Stateless across calls; one instance can serve every request.
#[derive(Clone)]
pub struct UploadProcessor {
    config: UploadConfig,
    diagnostics: Arc<dyn Diagnostics>,
}

impl std::fmt::Debug for UploadProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadProcessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for UploadProcessor {
    fn default() -> Self {
        Self::new(UploadConfig::default())
    }
}

impl UploadProcessor {
    /// Create a processor that logs to standard error.
    #[must_use]
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            diagnostics: Arc::new(StderrDiagnostics::default()),
        }
    }

    /// Replace the diagnostics destination.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Process `items` in order.
    ///
    /// Materialized files are registered with `cleanup`. Per-item upload
    /// failures are absorbed into the report; a sink error stops processing
    /// and is returned.
    pub fn process<I, P, A>(
        &self,
        items: impl IntoIterator<Item = I>,
        parameters: &mut P,
        attributes: &mut A,
        cleanup: &CleanupRegistry,
    ) -> Result<ProcessReport, SinkError>
    where
        I: DecodedItem,
        P: ParameterSink + ?Sized,
        A: AttributeSink + ?Sized,
    {
        let mut report = ProcessReport::default();
        for item in items {
            let outcome = self.process_item(item, parameters, attributes, cleanup)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn process_item<I, P, A>(
        &self,
        item: I,
        parameters: &mut P,
        attributes: &mut A,
        cleanup: &CleanupRegistry,
    ) -> Result<ItemOutcome, SinkError>
    where
        I: DecodedItem,
        P: ParameterSink + ?Sized,
        A: AttributeSink + ?Sized,
    {
        let field_name = item.field_name().to_string();

        if item.is_form_field() {
            parameters.set_parameter(&field_name, vec![item.value()])?;
            return Ok(ItemOutcome::Field { name: field_name });
        }

        if item.file_name().trim().is_empty() {
            self.diagnostics.info(
                LogEntry::new("upload.empty", "A file field was empty")
                    .field("field", field_name.as_str()),
            );
            return Ok(ItemOutcome::Skipped { field_name });
        }

        let file_name = item.file_name().to_string();
        match materialize(item, &self.config, cleanup) {
            Ok(file) => {
                let key = file.key();
                parameters.set_parameter(&field_name, vec![key.clone()])?;
                attributes.set_attribute(key.clone(), Box::new(file.clone()))?;
                self.diagnostics.info(
                    LogEntry::new("upload.stored", "Uploaded file")
                        .field("field", field_name.as_str())
                        .field("file_name", file.file_name())
                        .field("content_type", file.content_type())
                        .field("path", key)
                        .json_field("file", &file),
                );
                Ok(ItemOutcome::Stored { field_name, file })
            }
            Err(error) => {
                self.diagnostics.error(
                    LogEntry::new("upload.failed", "Failed to store uploaded file")
                        .field("field", field_name.as_str())
                        .field("file_name", file_name.as_str())
                        .field("cause", error.to_string()),
                );
                Ok(ItemOutcome::Failed {
                    field_name,
                    file_name,
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Part;
    use crate::sink::{RequestAttributes, RequestParameters};
    use crate::testing::{CapturingDiagnostics, FailingItem};

    fn processor(dir: &std::path::Path, diagnostics: &CapturingDiagnostics) -> UploadProcessor {
        UploadProcessor::new(UploadConfig::new().temp_dir(dir))
            .with_diagnostics(Arc::new(diagnostics.clone()))
    }

    #[test]
    fn form_field_becomes_parameter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let diagnostics = CapturingDiagnostics::new();
        let mut params = RequestParameters::new();
        let mut attrs = RequestAttributes::new();
        let cleanup = CleanupRegistry::new();

        let report = processor(dir.path(), &diagnostics)
            .process(
                vec![Part::field("age", "30")],
                &mut params,
                &mut attrs,
                &cleanup,
            )
            .expect("process");

        assert_eq!(params.get_all("age"), ["30".to_string()]);
        assert!(attrs.is_empty());
        assert!(cleanup.is_empty());
        assert!(diagnostics.entries().is_empty());
        assert_eq!(
            report.outcomes(),
            [ItemOutcome::Field {
                name: "age".to_string()
            }]
        );
    }

    #[test]
    fn whitespace_file_name_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let diagnostics = CapturingDiagnostics::new();
        let mut params = RequestParameters::new();
        let mut attrs = RequestAttributes::new();
        let cleanup = CleanupRegistry::new();

        let report = processor(dir.path(), &diagnostics)
            .process(
                vec![Part::file("photo", "   ", "image/png", Vec::new())],
                &mut params,
                &mut attrs,
                &cleanup,
            )
            .expect("process");

        assert!(params.is_empty());
        assert!(attrs.is_empty());
        assert!(cleanup.is_empty());
        assert_eq!(report.outcomes()[0].field_name(), "photo");
        assert!(matches!(report.outcomes()[0], ItemOutcome::Skipped { .. }));

        let entries = diagnostics.entries_for("upload.empty");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get_field("field"), Some("photo"));
    }

    #[test]
    fn failure_is_logged_with_file_name_and_cause() {
        let dir = tempfile::tempdir().expect("tempdir");
        let diagnostics = CapturingDiagnostics::new();
        let mut params = RequestParameters::new();
        let mut attrs = RequestAttributes::new();
        let cleanup = CleanupRegistry::new();

        let report = processor(dir.path(), &diagnostics)
            .process(
                vec![FailingItem::new("doc", "report.pdf")],
                &mut params,
                &mut attrs,
                &cleanup,
            )
            .expect("upload failures are not fatal");

        assert!(params.is_empty());
        assert!(attrs.is_empty());
        assert!(!report.is_clean());
        assert_eq!(report.failed_fields(), vec!["doc"]);

        let errors = diagnostics.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].target, "upload.failed");
        assert_eq!(errors[0].get_field("file_name"), Some("report.pdf"));
        assert!(
            errors[0]
                .get_field("cause")
                .is_some_and(|cause| cause.contains("simulated write failure"))
        );
    }

    #[test]
    fn stored_file_is_logged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let diagnostics = CapturingDiagnostics::new();
        let mut params = RequestParameters::new();
        let mut attrs = RequestAttributes::new();
        let cleanup = CleanupRegistry::new();

        let report = processor(dir.path(), &diagnostics)
            .process(
                vec![Part::file("doc", "a.txt", "text/plain", b"abc".to_vec())],
                &mut params,
                &mut attrs,
                &cleanup,
            )
            .expect("process");

        let stored = report.stored();
        assert_eq!(stored.len(), 1);
        let entries = diagnostics.entries_for("upload.stored");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].get_field("path"),
            Some(stored[0].key().as_str())
        );
        assert_eq!(entries[0].get_field("file_name"), Some("a.txt"));
        let json = entries[0].to_json();
        assert_eq!(json["file"]["content_type"], "text/plain");
        assert_eq!(json["file"]["path"], json["path"]);
    }
}
