//! Multipart body decoding for formbind.
//!
//! This crate turns a raw `multipart/form-data` request body into
//! [`formbind_core::Part`]s and runs them through an
//! [`formbind_core::UploadProcessor`].
//!
//! # Example
//!
//! ```no_run
//! use formbind_core::{RequestScope, UploadConfig, UploadProcessor};
//! use formbind_http::process_multipart;
//!
//! # fn handle(content_type: &str, body: Vec<u8>) -> Result<(), formbind_http::DecodeError> {
//! let processor = UploadProcessor::new(UploadConfig::default());
//! let mut scope = RequestScope::new();
//! let report = process_multipart(content_type, body, &processor, &mut scope)?;
//! for (field, error) in report.failures() {
//!     eprintln!("upload for {field} failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod multipart;

pub use multipart::{DecodeError, decode_multipart, process_multipart};
