//! `multipart/form-data` decoding.
//!
//! Byte-level parsing is delegated to `multer`; this module only turns its
//! fields into [`Part`]s in submission order and hands them to the core
//! processor.

use bytes::Bytes;
use futures::stream;
use multer::Multipart;

use formbind_core::{Part, ProcessReport, RequestScope, SinkError, UploadProcessor};

/// Errors from decoding a multipart body.
#[derive(Debug)]
pub enum DecodeError {
    /// Content-Type is not multipart or carries no usable boundary.
    MissingBoundary { detail: String },
    /// The body is not valid multipart data.
    Multipart { detail: String },
    /// A sink rejected a write while processing the decoded parts.
    Sink(SinkError),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBoundary { detail } => {
                write!(f, "missing boundary in multipart Content-Type: {detail}")
            }
            Self::Multipart { detail } => write!(f, "invalid multipart body: {detail}"),
            Self::Sink(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sink(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SinkError> for DecodeError {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

/// Decode a `multipart/form-data` body into parts, in submission order.
///
/// # Example
///
/// ```
/// use formbind_http::decode_multipart;
///
/// let body = concat!(
///     "--X\r\n",
///     "Content-Disposition: form-data; name=\"age\"\r\n",
///     "\r\n",
///     "30\r\n",
///     "--X--\r\n"
/// );
/// let parts = decode_multipart("multipart/form-data; boundary=X", body).unwrap();
/// assert_eq!(parts[0].name, "age");
/// assert_eq!(parts[0].text(), Some("30"));
/// ```
pub fn decode_multipart(
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Vec<Part>, DecodeError> {
    let boundary =
        multer::parse_boundary(content_type).map_err(|e| DecodeError::MissingBoundary {
            detail: e.to_string(),
        })?;
    let body = body.into();
    futures::executor::block_on(collect_parts(body, boundary))
}

async fn collect_parts(body: Bytes, boundary: String) -> Result<Vec<Part>, DecodeError> {
    let body_stream = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = Multipart::new(body_stream, boundary);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        parts.push(Part {
            name,
            filename,
            content_type,
            data: data.to_vec(),
        });
    }
    Ok(parts)
}

fn multipart_error(err: multer::Error) -> DecodeError {
    DecodeError::Multipart {
        detail: err.to_string(),
    }
}

/// Decode a body and process its parts into `scope`.
///
/// A body that fails to decode is rejected as a whole before any item is
/// processed; individual upload failures are reported in the returned
/// [`ProcessReport`].
pub fn process_multipart(
    content_type: &str,
    body: impl Into<Bytes>,
    processor: &UploadProcessor,
    scope: &mut RequestScope,
) -> Result<ProcessReport, DecodeError> {
    let parts = decode_multipart(content_type, body)?;
    Ok(scope.process_items(processor, parts)?)
}
