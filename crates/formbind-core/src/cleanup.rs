//! Request-scoped temp file cleanup.
//!
//! Every file the processor materializes is registered here. The registry
//! is owned by the request lifecycle and swept when the request is torn
//! down, either explicitly via [`CleanupRegistry::sweep`] or on drop.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Tracks temp files to delete at request teardown.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    paths: Mutex<Vec<PathBuf>>,
}

/// Result of a sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Files deleted, or already gone.
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted.
    pub failed: Vec<(PathBuf, std::io::Error)>,
}

impl SweepReport {
    /// Returns true if every registered file is gone.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CleanupRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file for deletion at teardown.
    pub fn register(&self, path: impl Into<PathBuf>) {
        self.paths.lock().push(path.into());
    }

    /// Stop tracking `path`, e.g. after the caller moved the file elsewhere.
    ///
    /// Returns true if the path was registered.
    pub fn forget(&self, path: &Path) -> bool {
        let mut paths = self.paths.lock();
        let before = paths.len();
        paths.retain(|p| p != path);
        paths.len() != before
    }

    /// Snapshot of the registered paths, in registration order.
    #[must_use]
    pub fn registered(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }

    /// Returns the number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Delete all registered files and clear the registry.
    pub fn sweep(&self) -> SweepReport {
        let paths = std::mem::take(&mut *self.paths.lock());
        let mut report = SweepReport::default();
        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    report.removed.push(path);
                }
                Err(err) => report.failed.push((path, err)),
            }
        }
        report
    }
}

impl Drop for CleanupRegistry {
    fn drop(&mut self) {
        for path in self.paths.get_mut().drain(..) {
            let _ = std::fs::remove_file(path);
        }
    }
}
