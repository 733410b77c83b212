//! Decoded multipart items.

use std::io::Write;

/// One already-decoded part of a multipart body.
///
/// Produced by an external multipart parser. `write_to` consumes the item,
/// so its bytes can be streamed to a destination only once.
pub trait DecodedItem {
    /// Returns true for plain form fields, false for file fields.
    fn is_form_field(&self) -> bool;

    /// The `name` from Content-Disposition.
    fn field_name(&self) -> &str;

    /// Textual value. Meaningful only for form fields.
    fn value(&self) -> String;

    /// Client-supplied file name. Meaningful only for file fields; empty or
    /// whitespace means the field was submitted without a chosen file.
    fn file_name(&self) -> &str;

    /// Declared content type of the part, if any.
    fn content_type(&self) -> Option<&str>;

    /// Stream the raw bytes into `dest`.
    fn write_to<W: Write>(self, dest: &mut W) -> std::io::Result<()>;
}

/// An in-memory decoded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Field name from Content-Disposition.
    pub name: String,
    /// Filename from Content-Disposition (if present).
    pub filename: Option<String>,
    /// Content-Type of the part (if present).
    pub content_type: Option<String>,
    /// The part's content.
    pub data: Vec<u8>,
}

impl Part {
    /// Create a form field part.
    #[must_use]
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    /// Create a file part.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }

    /// Returns true if this part is a file upload.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Get the content as a UTF-8 string.
    ///
    /// Returns `None` if the content is not valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl DecodedItem for Part {
    fn is_form_field(&self) -> bool {
        self.filename.is_none()
    }

    fn field_name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    fn file_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("")
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn write_to<W: Write>(self, dest: &mut W) -> std::io::Result<()> {
        dest.write_all(&self.data)
    }
}
