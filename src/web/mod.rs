//! Web framework integration surface.
//!
//! This module provides the boundary between HTTP frameworks and the
//! binder. It contains no framework-specific code: integrations implement
//! [`BindableRequest`](crate::BindableRequest) over their own request type,
//! or convert into a [`MemoryRequest`].
//!
//! # Integration Model
//!
//! Framework-specific extractors should:
//! 1. Expose the request through `BindableRequest`
//! 2. Hold one shared [`Binder`](crate::Binder), built at startup
//! 3. Call [`extract`] (path, query, body) or a single-source helper
//! 4. Map a [`BindError`](crate::BindError) to a client error response
//!    when [`BindErrorKind::is_client_error`](crate::BindErrorKind::is_client_error)
//!    holds, to a server error otherwise

mod adapter;
mod extract;

pub use adapter::MemoryRequest;
pub use extract::{extract, extract_headers, extract_query};
