use std::io::Read;

use crate::error::BindError;
use crate::source::{lookup, FileMap, ValueMap};

/// Fields and files of a parsed `multipart/form-data` body.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    /// Text fields
    pub values: ValueMap,
    /// Uploaded files
    pub files: FileMap,
}

/// Read access to the parts of an incoming request the binder consumes.
///
/// Framework integrations implement this over their own request type. The
/// binder never holds on to the request beyond a bind call.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use request_binder::{BindError, BindableRequest, MultipartForm, ValueMap};
///
/// struct QueryOnly {
///     query: ValueMap,
///     body: &'static [u8],
/// }
///
/// impl BindableRequest for QueryOnly {
///     fn body(&mut self) -> &mut dyn Read {
///         &mut self.body
///     }
///     fn path_pattern(&self) -> &str {
///         ""
///     }
///     fn path_value(&self, _name: &str) -> Option<String> {
///         None
///     }
///     fn query(&self) -> ValueMap {
///         self.query.clone()
///     }
///     fn headers(&self) -> ValueMap {
///         ValueMap::new()
///     }
///     fn content_length(&self) -> i64 {
///         0
///     }
///     fn form(&mut self) -> Result<ValueMap, BindError> {
///         Ok(self.query.clone())
///     }
///     fn multipart_form(&mut self, _max: u64) -> Result<MultipartForm, BindError> {
///         Err(BindError::MalformedRequest("not multipart".into()))
///     }
/// }
///
/// let request = QueryOnly { query: ValueMap::new(), body: b"" };
/// assert_eq!(request.content_type(), "");
/// ```
pub trait BindableRequest {
    /// The request body. Read at most once per request.
    fn body(&mut self) -> &mut dyn Read;

    /// The route pattern the request matched, or `""` when unrouted.
    fn path_pattern(&self) -> &str;

    /// The value of a named path parameter.
    fn path_value(&self, name: &str) -> Option<String>;

    /// URL query parameters.
    fn query(&self) -> ValueMap;

    /// Request headers.
    fn headers(&self) -> ValueMap;

    /// Declared body length; zero or negative when there is no body.
    fn content_length(&self) -> i64;

    /// The raw `Content-Type` header value.
    fn content_type(&self) -> String {
        lookup(&self.headers(), "Content-Type")
            .and_then(|values| values.first().cloned())
            .unwrap_or_default()
    }

    /// URL-encoded form values, parsed on demand.
    fn form(&mut self) -> Result<ValueMap, BindError>;

    /// The multipart form, parsed on demand with a body size limit.
    fn multipart_form(&mut self, max_body_size: u64) -> Result<MultipartForm, BindError>;
}
