//! Request-lifetime state for upload processing.
//!
//! [`RequestScope`] owns the stores one request writes into and the
//! cleanup registry for the files it materialized. Dropping the scope
//! sweeps the registry.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cleanup::{CleanupRegistry, SweepReport};
use crate::error::SinkError;
use crate::item::DecodedItem;
use crate::processor::{ProcessReport, UploadProcessor};
use crate::sink::{RequestAttributes, RequestParameters};
use crate::upload::UploadedFile;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Parameters, attributes and temp files belonging to one request.
///
/// # Example
///
/// ```
/// use formbind_core::{Part, RequestScope, UploadConfig, UploadProcessor};
///
/// let processor = UploadProcessor::new(UploadConfig::default());
/// let mut scope = RequestScope::new();
/// scope
///     .process_items(&processor, vec![Part::field("age", "30")])
///     .expect("in-memory stores never reject writes");
/// assert_eq!(scope.parameters().get("age"), Some("30"));
/// ```
#[derive(Debug)]
pub struct RequestScope {
    request_id: u64,
    parameters: RequestParameters,
    attributes: RequestAttributes,
    cleanup: CleanupRegistry,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    /// Create a scope with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a scope with a caller-assigned request id.
    #[must_use]
    pub fn with_request_id(request_id: u64) -> Self {
        Self {
            request_id,
            parameters: RequestParameters::new(),
            attributes: RequestAttributes::new(),
            cleanup: CleanupRegistry::new(),
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the request parameters.
    #[must_use]
    pub fn parameters(&self) -> &RequestParameters {
        &self.parameters
    }

    /// Returns the request attributes.
    #[must_use]
    pub fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    /// Returns the cleanup registry.
    #[must_use]
    pub fn cleanup(&self) -> &CleanupRegistry {
        &self.cleanup
    }

    /// Look up the upload stored for a parameter, via its path value.
    #[must_use]
    pub fn uploaded_file(&self, field_name: &str) -> Option<&UploadedFile> {
        let path = self.parameters.get(field_name)?;
        self.attributes.get::<UploadedFile>(path)
    }

    /// Run `processor` over `items`, writing into this scope's stores.
    pub fn process_items<I: DecodedItem>(
        &mut self,
        processor: &UploadProcessor,
        items: impl IntoIterator<Item = I>,
    ) -> Result<ProcessReport, SinkError> {
        processor.process(
            items,
            &mut self.parameters,
            &mut self.attributes,
            &self.cleanup,
        )
    }

    /// End the request: delete every registered temp file now.
    pub fn finish(self) -> SweepReport {
        self.cleanup.sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::item::Part;
    use crate::logging::NoopDiagnostics;
    use std::sync::Arc;

    #[test]
    fn request_ids_are_distinct() {
        assert_ne!(RequestScope::new().request_id(), RequestScope::new().request_id());
        assert_eq!(RequestScope::with_request_id(9).request_id(), 9);
    }

    #[test]
    fn finish_sweeps_uploads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let processor = UploadProcessor::new(UploadConfig::new().temp_dir(dir.path()))
            .with_diagnostics(Arc::new(NoopDiagnostics));

        let mut scope = RequestScope::new();
        scope
            .process_items(
                &processor,
                vec![Part::file("doc", "a.txt", "text/plain", b"abc".to_vec())],
            )
            .expect("process");

        let upload = scope.uploaded_file("doc").expect("stored upload").clone();
        assert!(upload.path().exists());

        let report = scope.finish();
        assert!(report.is_clean());
        assert_eq!(report.removed, vec![upload.path().to_path_buf()]);
        assert!(!upload.path().exists());
    }

    #[test]
    fn drop_sweeps_uploads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let processor = UploadProcessor::new(UploadConfig::new().temp_dir(dir.path()))
            .with_diagnostics(Arc::new(NoopDiagnostics));

        let path = {
            let mut scope = RequestScope::new();
            scope
                .process_items(
                    &processor,
                    vec![Part::file("doc", "a.txt", "text/plain", b"abc".to_vec())],
                )
                .expect("process");
            scope.uploaded_file("doc").expect("stored").path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
