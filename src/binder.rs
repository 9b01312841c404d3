//! The binder: per-source extraction, body dispatch and bind order.

use crate::body::{BodyDecoder, JsonBody, XmlBody};
use crate::config::BinderConfig;
use crate::engine::Walker;
use crate::error::BindError;
use crate::request::BindableRequest;
use crate::slot::Bindable;
use crate::source::{BindingSource, FileMap, ValueMap};

/// `application/json`
pub const MIME_APPLICATION_JSON: &str = "application/json";
/// `application/xml`
pub const MIME_APPLICATION_XML: &str = "application/xml";
/// `text/xml`
pub const MIME_TEXT_XML: &str = "text/xml";
/// `application/x-www-form-urlencoded`
pub const MIME_APPLICATION_FORM: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MIME_MULTIPART_FORM: &str = "multipart/form-data";

/// Binds request data onto typed destinations.
///
/// A binder is built once, from a [`BinderConfig`] and two body delegates,
/// and shared by reference. [`bind`](Binder::bind) runs path parameters,
/// then query parameters, then the body; each stage overwrites what the
/// previous one wrote to the same field.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use request_binder::{bindable, web::MemoryRequest, Binder};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct User {
///     #[serde(default)]
///     id: u64,
///     #[serde(default)]
///     name: String,
/// }
///
/// bindable! {
///     #[serde]
///     User {
///         id(param = "id"),
///         name(query = "name"),
///     }
/// }
///
/// let mut request = MemoryRequest::new()
///     .with_path("/users/{id}", [("id", "7")])
///     .with_query_string("name=ada");
///
/// let mut user = User::default();
/// Binder::default().bind(&mut request, &mut user).unwrap();
///
/// assert_eq!(user.id, 7);
/// assert_eq!(user.name, "ada");
/// ```
#[derive(Debug, Clone)]
pub struct Binder<J = JsonBody, X = XmlBody> {
    config: BinderConfig,
    json: J,
    xml: X,
}

impl Binder {
    /// Creates a binder with the default JSON and XML delegates.
    pub fn new(config: BinderConfig) -> Self {
        Self {
            config,
            json: JsonBody,
            xml: XmlBody,
        }
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new(BinderConfig::default())
    }
}

impl<J: BodyDecoder, X: BodyDecoder> Binder<J, X> {
    /// Replaces the JSON and XML body delegates.
    pub fn with_body_decoders<J2, X2>(self, json: J2, xml: X2) -> Binder<J2, X2>
    where
        J2: BodyDecoder,
        X2: BodyDecoder,
    {
        Binder {
            config: self.config,
            json,
            xml,
        }
    }

    /// The binder's configuration.
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Binds path parameters, query parameters and the body, in that order.
    ///
    /// Headers are not part of the default order; use
    /// [`bind_headers`](Binder::bind_headers).
    pub fn bind<R, T>(&self, request: &mut R, dest: &mut T) -> Result<(), BindError>
    where
        R: BindableRequest + ?Sized,
        T: Bindable,
    {
        self.bind_path_params(request, dest)?;
        self.bind_query_params(request, dest)?;
        self.bind_body(request, dest)
    }

    /// Binds path parameters into fields carrying the path tag.
    pub fn bind_path_params<R, T>(&self, request: &R, dest: &mut T) -> Result<(), BindError>
    where
        R: BindableRequest + ?Sized,
        T: Bindable,
    {
        let values = self.path_params(request);
        self.bind_values(dest, BindingSource::Path, &values, &FileMap::new())
    }

    /// Binds query parameters into fields carrying the query tag.
    pub fn bind_query_params<R, T>(&self, request: &R, dest: &mut T) -> Result<(), BindError>
    where
        R: BindableRequest + ?Sized,
        T: Bindable,
    {
        self.bind_values(dest, BindingSource::Query, &request.query(), &FileMap::new())
    }

    /// Binds headers into fields carrying the header tag.
    pub fn bind_headers<R, T>(&self, request: &R, dest: &mut T) -> Result<(), BindError>
    where
        R: BindableRequest + ?Sized,
        T: Bindable,
    {
        self.bind_values(dest, BindingSource::Header, &request.headers(), &FileMap::new())
    }

    /// Binds the request body, dispatching on its media type.
    ///
    /// A request without a body is left untouched. JSON and XML bodies need
    /// a destination that hands out a [`BodyTarget`](crate::BodyTarget);
    /// any other destination reports [`BindError::UnsupportedMediaType`].
    pub fn bind_body<R, T>(&self, request: &mut R, dest: &mut T) -> Result<(), BindError>
    where
        R: BindableRequest + ?Sized,
        T: Bindable,
    {
        let length = request.content_length();
        if length <= 0 {
            return Ok(());
        }

        let media_type = media_type(&request.content_type());
        tracing::debug!(media_type = %media_type, length, "binding request body");

        let result = match media_type.as_str() {
            MIME_APPLICATION_JSON => match dest.body_target() {
                Some(target) => self.json.decode(request.body(), target),
                None => Err(BindError::UnsupportedMediaType {
                    media_type: media_type.clone(),
                }),
            },
            MIME_APPLICATION_XML | MIME_TEXT_XML => match dest.body_target() {
                Some(target) => self.xml.decode(request.body(), target),
                None => Err(BindError::UnsupportedMediaType {
                    media_type: media_type.clone(),
                }),
            },
            MIME_APPLICATION_FORM => {
                let form = request.form()?;
                self.bind_values(dest, BindingSource::Form, &form, &FileMap::new())
            }
            MIME_MULTIPART_FORM => {
                let max = self.config.max_body_size();
                let declared = length.unsigned_abs();
                if declared > max {
                    return Err(BindError::BodyTooLarge {
                        length: declared,
                        max,
                    });
                }
                let form = request.multipart_form(max)?;
                self.bind_values(dest, BindingSource::Form, &form.values, &form.files)
            }
            _ => Err(BindError::UnsupportedMediaType {
                media_type: media_type.clone(),
            }),
        };

        if let Err(err) = &result {
            tracing::debug!(error = %err, "body binding failed");
        }
        result
    }

    /// Binds already extracted data from one source.
    ///
    /// `files` holds uploads keyed by form field; pass an empty map for
    /// sources that carry none.
    pub fn bind_values<T>(
        &self,
        dest: &mut T,
        source: BindingSource,
        values: &ValueMap,
        files: &FileMap,
    ) -> Result<(), BindError>
    where
        T: Bindable + ?Sized,
    {
        tracing::debug!(
            source = %source,
            keys = values.len(),
            files = files.len(),
            "binding request data"
        );

        let walker = Walker::new(&self.config, source);
        let result = walker.bind(&mut dest.slot(), values, files);
        if let Err(err) = &result {
            tracing::debug!(source = %source, error = %err, "binding failed");
        }
        result
    }

    /// Path parameters of the request, named after the route pattern.
    ///
    /// A trailing `...` on a name marks a wildcard and is dropped. A name
    /// the request has no value for maps to an empty string.
    pub fn path_params<R>(&self, request: &R) -> ValueMap
    where
        R: BindableRequest + ?Sized,
    {
        let mut values = ValueMap::new();
        let pattern = request.path_pattern();
        if pattern.is_empty() {
            return values;
        }

        for captures in self.config.path_pattern().captures_iter(pattern) {
            let Some(name) = captures.get(1) else {
                continue;
            };
            let name = name.as_str().trim_end_matches("...");
            let value = request.path_value(name).unwrap_or_default();
            values.insert(name.to_string(), vec![value]);
        }
        values
    }
}

/// Lower-cased media type with parameters dropped.
fn media_type(content_type: &str) -> String {
    let base = content_type
        .split_once(';')
        .map_or(content_type, |(base, _)| base);
    base.trim().to_ascii_lowercase()
}
