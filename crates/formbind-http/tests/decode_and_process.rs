//! Decoding real multipart bodies and binding them into a request scope.

use std::sync::Arc;

use formbind_core::testing::CapturingDiagnostics;
use formbind_core::{ItemOutcome, RequestScope, UploadConfig, UploadProcessor, UploadedFile};
use formbind_http::{DecodeError, process_multipart};

const BOUNDARY: &str = "----formbind7MA4YWxkTrZu0gW";

fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

fn body(png: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"age\"\r\n\r\n30\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"avatar\"; filename=\"pic.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"empty\"; filename=\"\"\r\n");
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[test]
fn binds_fields_and_uploads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagnostics = CapturingDiagnostics::new();
    let processor = UploadProcessor::new(UploadConfig::new().temp_dir(dir.path()))
        .with_diagnostics(Arc::new(diagnostics.clone()));
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xFF, 0xD8];

    let mut scope = RequestScope::new();
    let report = process_multipart(&content_type(), body(&png), &processor, &mut scope)
        .expect("process");

    assert!(report.is_clean());
    assert_eq!(report.len(), 3);
    assert!(matches!(&report.outcomes()[0], ItemOutcome::Field { name } if name == "age"));
    assert_eq!(scope.parameters().get("age"), Some("30"));

    let path = scope.parameters().get("avatar").expect("avatar parameter");
    let upload = scope
        .attributes()
        .get::<UploadedFile>(path)
        .expect("descriptor keyed by path");
    assert_eq!(upload.file_name(), "pic.png");
    assert_eq!(upload.content_type(), "image/png");
    assert_eq!(upload.bytes().expect("read upload"), png);
    assert_eq!(diagnostics.entries_for("upload.stored").len(), 1);

    assert!(matches!(
        &report.outcomes()[2],
        ItemOutcome::Skipped { field_name } if field_name == "empty"
    ));
    assert!(!scope.parameters().contains("empty"));
    assert_eq!(diagnostics.entries_for("upload.empty").len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 1);

    let stored_path = upload.path().to_path_buf();
    assert!(scope.finish().is_clean());
    assert!(!stored_path.exists());
}

#[test]
fn undecodable_body_processes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let processor = UploadProcessor::new(UploadConfig::new().temp_dir(dir.path()));
    let mut scope = RequestScope::new();

    let mut truncated = body(b"abc");
    truncated.truncate(truncated.len() - 12);

    let err = process_multipart(&content_type(), truncated, &processor, &mut scope)
        .expect_err("truncated body");
    assert!(matches!(err, DecodeError::Multipart { .. }));
    assert!(scope.parameters().is_empty());
    assert!(scope.attributes().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
}

#[test]
fn missing_boundary_is_reported() {
    let processor = UploadProcessor::default();
    let mut scope = RequestScope::new();
    let err = process_multipart("multipart/form-data", Vec::new(), &processor, &mut scope)
        .expect_err("no boundary");
    assert!(matches!(err, DecodeError::MissingBoundary { .. }));
    assert!(err.to_string().starts_with("missing boundary"));
}
