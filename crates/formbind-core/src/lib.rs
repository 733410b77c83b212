//! Core types for binding multipart uploads into a request.
//!
//! This crate provides:
//! - [`DecodedItem`] and [`Part`] for already-decoded multipart items
//! - [`UploadProcessor`] turning items into parameters and stored files
//! - [`UploadedFile`] descriptors kept in request attributes
//! - [`ParameterSink`] / [`AttributeSink`] and their default stores
//! - [`CleanupRegistry`] and [`RequestScope`] for request-lifetime temp files
//! - Structured [`Diagnostics`] via the [`logging`] module
//!
//! # Design Principles
//!
//! - One bad upload never sinks the request: failures are reported per item
//! - No process-wide state besides the temp-file name counter
//! - Temp files are deleted deterministically when the request ends
//!
//! # Example
//!
//! ```no_run
//! use formbind_core::{Part, RequestScope, UploadConfig, UploadProcessor};
//!
//! let processor = UploadProcessor::new(UploadConfig::default());
//! let mut scope = RequestScope::new();
//! let report = scope
//!     .process_items(
//!         &processor,
//!         vec![
//!             Part::field("age", "30"),
//!             Part::file("avatar", "pic.png", "image/png", vec![0xFF, 0xD8]),
//!         ],
//!     )
//!     .expect("in-memory stores never reject writes");
//!
//! let avatar = scope.uploaded_file("avatar").expect("stored");
//! assert_eq!(avatar.file_name(), "pic.png");
//! assert!(report.is_clean());
//! ```

#![forbid(unsafe_code)]

mod cleanup;
pub mod config;
pub mod error;
mod item;
pub mod logging;
mod processor;
mod scope;
mod sink;
pub mod testing;
mod upload;

pub use cleanup::{CleanupRegistry, SweepReport};
pub use config::{DEFAULT_CONTENT_TYPE, DEFAULT_FILE_PREFIX, DEFAULT_FILE_SUFFIX, UploadConfig};
pub use error::{SinkError, UploadError};
pub use item::{DecodedItem, Part};
pub use logging::{Diagnostics, LogConfig, LogEntry, LogLevel, NoopDiagnostics, StderrDiagnostics};
pub use processor::{ItemOutcome, ProcessReport, UploadProcessor};
pub use scope::RequestScope;
pub use sink::{AttributeSink, ParameterSink, RequestAttributes, RequestParameters};
pub use upload::{UploadedFile, create_upload_tempfile, materialize};
