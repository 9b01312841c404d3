//! In-memory request adapter.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use url::form_urlencoded;

use crate::binder::{MIME_APPLICATION_FORM, MIME_MULTIPART_FORM};
use crate::error::BindError;
use crate::request::{BindableRequest, MultipartForm};
use crate::source::{lookup, ValueMap};

/// A request assembled from owned parts.
///
/// `MemoryRequest` implements [`BindableRequest`] for framework integrations
/// that already hold parsed request parts, and for tests. It contains
/// simple, owned data only: framework-specific code should convert its own
/// request type into one.
///
/// # Examples
///
/// ```
/// use request_binder::web::MemoryRequest;
/// use request_binder::BindableRequest;
///
/// let request = MemoryRequest::new()
///     .with_path("/users/{id}", [("id", "42")])
///     .with_query_string("tag=a&tag=b")
///     .with_header("X-Request-Id", "req-1");
///
/// assert_eq!(request.path_value("id").as_deref(), Some("42"));
/// assert_eq!(request.query()["tag"], vec!["a", "b"]);
/// assert_eq!(request.header("x-request-id"), Some("req-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRequest {
    path_pattern: String,
    path_values: BTreeMap<String, String>,
    query: ValueMap,
    headers: ValueMap,
    body: Cursor<Vec<u8>>,
    content_length: i64,
    form: Option<ValueMap>,
    multipart: Option<MultipartForm>,
}

impl MemoryRequest {
    /// Creates an empty request: no route, no query, no headers, no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the matched route pattern and its parameter values.
    pub fn with_path<I, K, V>(mut self, pattern: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.path_pattern = pattern.into();
        self.path_values = values
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self
    }

    /// Adds a query parameter value.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Adds every parameter of a URL-encoded query string.
    pub fn with_query_string(mut self, query: &str) -> Self {
        append_pairs(&mut self.query, query.as_bytes());
        self
    }

    /// Adds a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Sets the body and its content type.
    ///
    /// The content length is the length of `body`.
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        self.content_length = i64::try_from(body.len()).unwrap_or(i64::MAX);
        self.body = Cursor::new(body);
        self.form = None;
        self.set_content_type(content_type);
        self
    }

    /// Sets an already parsed multipart form as the body.
    ///
    /// The content length is the total size of field values and file
    /// contents.
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        let values: usize = form
            .values
            .iter()
            .map(|(key, values)| key.len() + values.iter().map(String::len).sum::<usize>())
            .sum();
        let files: usize = form
            .files
            .values()
            .flat_map(|files| files.iter().map(|file| file.size()))
            .sum();
        self.content_length = i64::try_from(values + files).unwrap_or(i64::MAX);
        self.multipart = Some(form);
        self.set_content_type(&format!("{MIME_MULTIPART_FORM}; boundary=memory"));
        self
    }

    /// Overrides the declared content length.
    pub fn with_content_length(mut self, content_length: i64) -> Self {
        self.content_length = content_length;
        self
    }

    /// The first value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case("Content-Type"));
        self.headers
            .insert("Content-Type".to_string(), vec![content_type.to_string()]);
    }

    fn is_url_encoded(&self) -> bool {
        let content_type = self.content_type();
        let base = content_type
            .split_once(';')
            .map_or(content_type.as_str(), |(base, _)| base);
        base.trim().eq_ignore_ascii_case(MIME_APPLICATION_FORM)
    }
}

fn append_pairs(target: &mut ValueMap, input: &[u8]) {
    for (key, value) in form_urlencoded::parse(input) {
        target
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
}

impl BindableRequest for MemoryRequest {
    fn body(&mut self) -> &mut dyn Read {
        &mut self.body
    }

    fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    fn path_value(&self, name: &str) -> Option<String> {
        self.path_values.get(name).cloned()
    }

    fn query(&self) -> ValueMap {
        self.query.clone()
    }

    fn headers(&self) -> ValueMap {
        self.headers.clone()
    }

    fn content_length(&self) -> i64 {
        self.content_length
    }

    /// Body values come first, followed by query values for the same key.
    fn form(&mut self) -> Result<ValueMap, BindError> {
        if let Some(form) = &self.form {
            return Ok(form.clone());
        }

        let mut form = ValueMap::new();
        if self.is_url_encoded() {
            let mut body = Vec::new();
            self.body.read_to_end(&mut body)?;
            append_pairs(&mut form, &body);
        }
        for (key, values) in &self.query {
            form.entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }

        self.form = Some(form.clone());
        Ok(form)
    }

    fn multipart_form(&mut self, max_body_size: u64) -> Result<MultipartForm, BindError> {
        let length = self.content_length.unsigned_abs();
        if self.content_length > 0 && length > max_body_size {
            return Err(BindError::BodyTooLarge {
                length,
                max: max_body_size,
            });
        }
        self.multipart.clone().ok_or_else(|| {
            BindError::MalformedRequest("request body is not a multipart form".to_string())
        })
    }
}
