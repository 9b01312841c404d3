//! Declarative binding of request data onto typed destinations.
//!
//! This crate fills a destination value from the parts of an incoming
//! request: path parameters, query parameters, headers, URL-encoded and
//! multipart forms (including uploaded files), and JSON or XML bodies.
//! Each record field declares, per source, the external key it is fed from.
//!
//! # Core Types
//!
//! - [`Binder`]: front door; extracts per-source data and applies the bind order
//! - [`BinderConfig`]: immutable tag names, notation patterns and limits
//! - [`Bindable`]: implemented by every type the engine can fill
//! - [`bindable!`]: declares a struct's tagged fields
//! - [`Decode`] / [`decodable!`]: custom decoding for leaf types
//! - [`BindableRequest`]: the request capability the binder consumes
//! - [`BodyTarget`]: a destination JSON and XML bodies can decode into
//! - [`BindError`]: the first failure of a bind call
//!
//! # Notation
//!
//! Nested destinations are addressed with dot paths (`user.address.city`),
//! bracket keys (`meta[colour]`, `user[address][city]`) and bracket indices
//! (`tags[0]`, `items[2].name`). Indices above the configured maximum (1000
//! by default) are rejected.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use request_binder::{bindable, Binder, BindingSource, FileMap, ValueMap};
//!
//! #[derive(Debug, Default)]
//! struct Filter {
//!     ids: Vec<u32>,
//!     labels: HashMap<String, String>,
//!     active: Option<bool>,
//! }
//!
//! bindable! {
//!     Filter {
//!         ids(query = "id"),
//!         labels(query = "label"),
//!         active(query = "active"),
//!     }
//! }
//!
//! let mut query = ValueMap::new();
//! query.insert("id".into(), vec!["3".into(), "5".into()]);
//! query.insert("label[env]".into(), vec!["prod".into()]);
//! query.insert("Active".into(), vec!["T".into()]);
//!
//! let mut filter = Filter::default();
//! Binder::default()
//!     .bind_values(&mut filter, BindingSource::Query, &query, &FileMap::new())
//!     .unwrap();
//!
//! assert_eq!(filter.ids, vec![3, 5]);
//! assert_eq!(filter.labels["env"], "prod");
//! assert_eq!(filter.active, Some(true));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod body;
mod config;
mod decode;
mod engine;
mod error;
mod file;
mod record;
mod request;
mod shape;
mod slot;
mod source;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use binder::{
    Binder, MIME_APPLICATION_FORM, MIME_APPLICATION_JSON, MIME_APPLICATION_XML,
    MIME_MULTIPART_FORM, MIME_TEXT_XML,
};
pub use body::{BodyDecoder, BodyTarget, JsonBody, XmlBody};
pub use config::{BinderConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_INDEX};
pub use decode::Decode;
pub use error::{BindError, BindErrorKind, DecodeError};
pub use file::UploadedFile;
pub use request::{BindableRequest, MultipartForm};
pub use shape::{Capabilities, Field, FileBinding, FileHandle, MapValue, ScalarKind, Shape};
pub use slot::{Bindable, FileSlot, ListSlot, Mapping, OptionalSlot, Record, Scalar, Slot};
pub use source::{BindingSource, FileMap, ValueMap};
