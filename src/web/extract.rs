//! Extractor functions building bound values from requests.
//!
//! These are the convenience surface for handlers: build a default
//! destination, run the binder over the request, hand back the value.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code implements BindableRequest (or builds a MemoryRequest)
//!   ↓
//! Call extract() or extract_query()
//!   ↓
//! Receive the bound destination, or the first BindError
//! ```

use crate::binder::Binder;
use crate::body::BodyDecoder;
use crate::error::BindError;
use crate::request::BindableRequest;
use crate::slot::Bindable;

/// Builds a `T` from path parameters, query parameters and the body.
///
/// # Errors
///
/// Returns the first [`BindError`] raised by any stage. A JSON or XML body
/// aimed at a record declared without `#[serde]` is an unsupported media
/// type.
///
/// # Examples
///
/// ```
/// use request_binder::web::{extract, MemoryRequest};
/// use request_binder::{bindable, Binder};
///
/// #[derive(Debug, Default)]
/// struct Login {
///     user: String,
///     remember: bool,
/// }
///
/// bindable! {
///     Login {
///         user(form = "user"),
///         remember(query = "remember", form = "remember"),
///     }
/// }
///
/// let mut request = MemoryRequest::new()
///     .with_query("remember", "t")
///     .with_body("application/x-www-form-urlencoded", "user=ada");
///
/// let login: Login = extract(&Binder::default(), &mut request).unwrap();
/// assert_eq!(login.user, "ada");
/// assert!(login.remember);
/// ```
pub fn extract<T, R, J, X>(binder: &Binder<J, X>, request: &mut R) -> Result<T, BindError>
where
    T: Default + Bindable,
    R: BindableRequest + ?Sized,
    J: BodyDecoder,
    X: BodyDecoder,
{
    let mut value = T::default();
    binder.bind(request, &mut value)?;
    Ok(value)
}

/// Builds a `T` from query parameters alone.
///
/// # Examples
///
/// ```
/// use request_binder::web::{extract_query, MemoryRequest};
/// use request_binder::{bindable, Binder};
///
/// #[derive(Debug, Default)]
/// struct Page {
///     number: u32,
///     size: Option<u8>,
/// }
///
/// bindable! {
///     Page {
///         number(query = "page"),
///         size(query = "size"),
///     }
/// }
///
/// let request = MemoryRequest::new().with_query_string("page=4");
/// let page: Page = extract_query(&Binder::default(), &request).unwrap();
///
/// assert_eq!(page.number, 4);
/// assert_eq!(page.size, None);
/// ```
pub fn extract_query<T, R, J, X>(binder: &Binder<J, X>, request: &R) -> Result<T, BindError>
where
    T: Default + Bindable,
    R: BindableRequest + ?Sized,
    J: BodyDecoder,
    X: BodyDecoder,
{
    let mut value = T::default();
    binder.bind_query_params(request, &mut value)?;
    Ok(value)
}

/// Builds a `T` from request headers alone.
pub fn extract_headers<T, R, J, X>(binder: &Binder<J, X>, request: &R) -> Result<T, BindError>
where
    T: Default + Bindable,
    R: BindableRequest + ?Sized,
    J: BodyDecoder,
    X: BodyDecoder,
{
    let mut value = T::default();
    binder.bind_headers(request, &mut value)?;
    Ok(value)
}
