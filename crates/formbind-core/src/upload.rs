//! Uploaded file descriptors and temp-file materialization.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::cleanup::CleanupRegistry;
use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::item::DecodedItem;

/// A successfully persisted upload.
///
/// Stored in the request attributes under [`UploadedFile::key`], which is
/// also the value written to the parameters for the item's field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    path: PathBuf,
    file_name: String,
    content_type: String,
}

impl UploadedFile {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Absolute path of the persisted file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original client-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content type of the upload.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The path as a string: parameter value and attribute key.
    #[must_use]
    pub fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Read the persisted bytes.
    pub fn bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

impl std::fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) at {}",
            self.file_name,
            self.content_type,
            self.path.display()
        )
    }
}

/// Allocate a new, empty, uniquely named file following the config's
/// prefix/suffix convention, in an absolute temp directory.
///
/// The file is deleted when the returned handle drops unless it is kept.
pub fn create_upload_tempfile(config: &UploadConfig) -> std::io::Result<NamedTempFile> {
    let temp_dir = std::path::absolute(config.get_temp_dir())?;
    tempfile::Builder::new()
        .prefix(config.get_file_prefix())
        .suffix(config.get_file_suffix())
        .tempfile_in(temp_dir)
}

/// Persist a file item to a fresh temp file registered with `cleanup`.
///
/// Either the full byte stream lands on disk or the partial file is
/// removed. A partial file that cannot be removed is registered so the
/// teardown sweep reclaims it.
pub fn materialize<I: DecodedItem>(
    item: I,
    config: &UploadConfig,
    cleanup: &CleanupRegistry,
) -> Result<UploadedFile, UploadError> {
    let mut temp = create_upload_tempfile(config).map_err(|e| UploadError::temp_file(&e))?;

    let file_name = item.file_name().to_string();
    let content_type = item
        .content_type()
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(config.get_default_content_type())
        .to_string();

    let written = item.write_to(&mut temp).and_then(|()| temp.flush());
    if let Err(err) = written {
        let path = temp.path().to_path_buf();
        let removal = temp.close();
        return Err(discard_partial(path, &err, removal, cleanup));
    }

    let path = temp.path().to_path_buf();
    let (_, path) = temp.keep().map_err(|e| UploadError::write(path, &e.error))?;
    cleanup.register(path.clone());

    Ok(UploadedFile::new(path, file_name, content_type))
}

/// Build the error for a failed write, registering the partial file when
/// it could not be removed.
fn discard_partial(
    path: PathBuf,
    err: &std::io::Error,
    removal: std::io::Result<()>,
    cleanup: &CleanupRegistry,
) -> UploadError {
    match removal {
        Ok(()) => UploadError::write(path, err),
        Err(removal) if removal.kind() == std::io::ErrorKind::NotFound => {
            UploadError::write(path, err)
        }
        Err(removal) => {
            cleanup.register(path.clone());
            UploadError::Write {
                path,
                detail: format!("{err}; partial file not removed: {removal}"),
            }
        }
    }
}
