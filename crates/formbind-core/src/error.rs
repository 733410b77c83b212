//! Error types.

use std::path::PathBuf;

/// Failure while materializing a single file item.
///
/// These never abort a batch; they are reported per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The temp file could not be allocated.
    TempFile { detail: String },
    /// The item's bytes could not be written to the allocated file.
    Write { path: PathBuf, detail: String },
}

impl UploadError {
    pub(crate) fn temp_file(err: &std::io::Error) -> Self {
        Self::TempFile {
            detail: err.to_string(),
        }
    }

    pub(crate) fn write(path: PathBuf, err: &std::io::Error) -> Self {
        Self::Write {
            path,
            detail: err.to_string(),
        }
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TempFile { detail } => write!(f, "failed to allocate temp file: {detail}"),
            Self::Write { path, detail } => {
                write!(f, "failed to write upload to {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for UploadError {}

/// A parameter or attribute sink rejected a write.
///
/// Unlike [`UploadError`], this aborts processing: a broken sink is a
/// configuration problem, not a per-item data issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    /// Which sink failed (`"parameters"` or `"attributes"`).
    pub sink: &'static str,
    /// Failure detail.
    pub detail: String,
}

impl SinkError {
    /// Create a new sink error.
    #[must_use]
    pub fn new(sink: &'static str, detail: impl Into<String>) -> Self {
        Self {
            sink,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sink rejected write: {}", self.sink, self.detail)
    }
}

impl std::error::Error for SinkError {}
