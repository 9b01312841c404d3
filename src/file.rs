//! Uploaded multipart files.

use std::io::Cursor;

use crate::source::ValueMap;

/// A file uploaded through a `multipart/form-data` body.
///
/// The adapter that parsed the body owns the content; destinations receive
/// either a clone or a shared `Arc<UploadedFile>`.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use request_binder::UploadedFile;
///
/// let file = UploadedFile::new("report.csv", b"a,b\n1,2\n".to_vec())
///     .with_content_type("text/csv");
///
/// let mut text = String::new();
/// file.open().read_to_string(&mut text).unwrap();
/// assert_eq!(text, "a,b\n1,2\n");
/// assert_eq!(file.size(), 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    headers: ValueMap,
    content: Vec<u8>,
}

impl UploadedFile {
    /// Creates an uploaded file from its name and content.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            headers: ValueMap::new(),
            content,
        }
    }

    /// Sets the declared content type of the part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a part header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// The client-supplied file name.
    pub fn name(&self) -> &str {
        &self.filename
    }

    /// The declared content type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Part headers.
    pub fn headers(&self) -> &ValueMap {
        &self.headers
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Opens the content for reading.
    pub fn open(&self) -> Cursor<&[u8]> {
        Cursor::new(self.content.as_slice())
    }
}
