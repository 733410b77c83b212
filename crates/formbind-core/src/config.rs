//! Upload processing configuration.

use std::path::{Path, PathBuf};

/// Default prefix for materialized upload files.
pub const DEFAULT_FILE_PREFIX: &str = "formbind.";

/// Default suffix for materialized upload files.
pub const DEFAULT_FILE_SUFFIX: &str = ".upload";

/// Content type recorded for file parts that did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Configuration for upload materialization.
///
/// The prefix/suffix pair is what external cleanup tooling matches on, so
/// keep it stable across deployments.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory temp files are created in.
    temp_dir: PathBuf,
    /// File name prefix.
    file_prefix: String,
    /// File name suffix.
    file_suffix: String,
    /// Content type for file parts without one.
    default_content_type: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl UploadConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory uploads are materialized in.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Set the temp file name prefix.
    #[must_use]
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the temp file name suffix.
    #[must_use]
    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    /// Set the content type used when a file part declares none.
    #[must_use]
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Get the temp directory.
    #[must_use]
    pub fn get_temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Get the temp file name prefix.
    #[must_use]
    pub fn get_file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Get the temp file name suffix.
    #[must_use]
    pub fn get_file_suffix(&self) -> &str {
        &self.file_suffix
    }

    /// Get the fallback content type.
    #[must_use]
    pub fn get_default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// Returns true if `file_name` follows this config's prefix/suffix convention.
    #[must_use]
    pub fn matches_convention(&self, file_name: &str) -> bool {
        file_name.len() >= self.file_prefix.len() + self.file_suffix.len()
            && file_name.starts_with(&self.file_prefix)
            && file_name.ends_with(&self.file_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = UploadConfig::default();
        assert_eq!(config.get_temp_dir(), std::env::temp_dir().as_path());
        assert_eq!(config.get_file_prefix(), "formbind.");
        assert_eq!(config.get_file_suffix(), ".upload");
        assert_eq!(
            config.get_default_content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn builder_overrides() {
        let config = UploadConfig::new()
            .temp_dir("/var/spool/uploads")
            .file_prefix("app-")
            .file_suffix(".bin")
            .default_content_type("text/plain");
        assert_eq!(config.get_temp_dir(), Path::new("/var/spool/uploads"));
        assert_eq!(config.get_file_prefix(), "app-");
        assert_eq!(config.get_file_suffix(), ".bin");
        assert_eq!(config.get_default_content_type(), "text/plain");
    }

    #[test]
    fn convention_matching() {
        let config = UploadConfig::default();
        assert!(config.matches_convention("formbind.42-1-1.upload"));
        assert!(!config.matches_convention("other.42.upload"));
        assert!(!config.matches_convention("formbind.42.tmp"));
        assert!(!config.matches_convention("formbind.upload"));
    }
}
