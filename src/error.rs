use std::error::Error as StdError;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use thiserror::Error;

/// Errors that can occur while binding request data onto a destination.
///
/// The first error raised anywhere in a bind call aborts the whole call.
/// Fields written before the failure stay written; there is no rollback.
#[derive(Debug, Error)]
pub enum BindError {
    /// The request body has a content type the binder cannot dispatch.
    #[error("unsupported media type: {media_type:?}")]
    UnsupportedMediaType {
        /// Normalized media type of the request
        media_type: String,
    },

    /// The destination is neither a record nor a supported mapping.
    #[error("binding element must be a record or a string-keyed mapping, found {found}")]
    IncompatibleDestination {
        /// Shape of the rejected destination
        found: &'static str,
    },

    /// A bracketed collection index is not a number.
    #[error("invalid collection index {index:?} for field {field:?}")]
    InvalidCollectionIndex {
        /// External key of the list field
        field: String,
        /// The offending index literal
        index: String,
    },

    /// A collection index is above the configured (or fixed) maximum.
    #[error("index {index} of field {field:?} exceeds the maximum allowed index of {max}")]
    IndexExceedsMaximum {
        /// External key of the list field
        field: String,
        /// The requested index
        index: usize,
        /// The largest index accepted
        max: usize,
    },

    /// An embedded record carries a tag for the source being bound.
    #[error("source tags are not allowed on embedded record field `{field}`")]
    TaggedEmbeddedField {
        /// Name of the embedded field
        field: &'static str,
    },

    /// A bare, non-optional file handle cannot represent "no file uploaded".
    #[error("cannot bind `{field}` to a bare file handle, use an optional or a list")]
    UnsupportedFileDestination {
        /// Name of the file field
        field: &'static str,
    },

    /// A string value reached a destination that is not a scalar.
    #[error("cannot coerce a string value into a {shape} destination")]
    UnknownScalarKind {
        /// Shape of the destination
        shape: &'static str,
    },

    /// An optional wrapped directly in another optional.
    #[error("only one level of optional indirection is supported")]
    NestedOptional,

    /// The declared body length is above the configured maximum.
    #[error("request body of {length} bytes exceeds the maximum of {max} bytes")]
    BodyTooLarge {
        /// Declared content length
        length: u64,
        /// Configured maximum
        max: u64,
    },

    /// Integer parsing failed.
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),

    /// Float parsing failed.
    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),

    /// Boolean parsing failed.
    #[error(transparent)]
    ParseBool(#[from] ParseBoolError),

    /// A destination-supplied decoder rejected its input.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The JSON body delegate failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The XML body delegate failed.
    #[error(transparent)]
    Xml(#[from] quick_xml::DeError),

    /// Reading the request failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The request adapter could not produce the requested data.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl BindError {
    /// Returns the category of this error.
    pub fn kind(&self) -> BindErrorKind {
        match self {
            Self::UnsupportedMediaType { .. } => BindErrorKind::UnsupportedMediaType,
            Self::IncompatibleDestination { .. } => BindErrorKind::IncompatibleDestination,
            Self::InvalidCollectionIndex { .. } => BindErrorKind::InvalidCollectionIndex,
            Self::IndexExceedsMaximum { .. } => BindErrorKind::IndexExceedsMaximum,
            Self::TaggedEmbeddedField { .. } => BindErrorKind::TaggedEmbeddedField,
            Self::UnsupportedFileDestination { .. } => BindErrorKind::UnsupportedFileDestination,
            Self::UnknownScalarKind { .. } => BindErrorKind::UnknownScalarKind,
            Self::NestedOptional => BindErrorKind::NestedOptional,
            Self::BodyTooLarge { .. } => BindErrorKind::BodyTooLarge,
            Self::ParseInt(_) | Self::ParseFloat(_) | Self::ParseBool(_) => BindErrorKind::Parse,
            Self::Decode(_) => BindErrorKind::Decode,
            Self::Json(_) => BindErrorKind::Json,
            Self::Xml(_) => BindErrorKind::Xml,
            Self::Io(_) => BindErrorKind::Io,
            Self::MalformedRequest(_) => BindErrorKind::MalformedRequest,
        }
    }
}

/// Category of a [`BindError`].
///
/// Stable, copyable classification so callers can map failures onto
/// responses without matching on error payloads.
///
/// # Examples
///
/// ```
/// use request_binder::{BindError, BindErrorKind};
///
/// let err = BindError::UnsupportedMediaType { media_type: "text/csv".into() };
/// assert_eq!(err.kind(), BindErrorKind::UnsupportedMediaType);
/// assert!(err.kind().is_client_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindErrorKind {
    /// Body content type cannot be dispatched.
    UnsupportedMediaType,
    /// Destination is not a record or supported mapping.
    IncompatibleDestination,
    /// Non-numeric collection index.
    InvalidCollectionIndex,
    /// Collection index above the maximum.
    IndexExceedsMaximum,
    /// Tagged embedded record.
    TaggedEmbeddedField,
    /// Bare file-handle destination.
    UnsupportedFileDestination,
    /// Value routed to a non-scalar destination.
    UnknownScalarKind,
    /// Optional inside optional.
    NestedOptional,
    /// Body above the configured size.
    BodyTooLarge,
    /// Malformed numeral or boolean.
    Parse,
    /// Custom decoder failure.
    Decode,
    /// JSON body failure.
    Json,
    /// XML body failure.
    Xml,
    /// I/O failure while reading the request.
    Io,
    /// Adapter-level request failure.
    MalformedRequest,
}

impl BindErrorKind {
    /// Returns `true` when the failure is caused by request content rather
    /// than by the declaration of the destination type.
    pub fn is_client_error(self) -> bool {
        !matches!(
            self,
            Self::TaggedEmbeddedField | Self::UnsupportedFileDestination | Self::NestedOptional
        )
    }
}

impl fmt::Display for BindErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedMediaType => "unsupported media type",
            Self::IncompatibleDestination => "incompatible destination",
            Self::InvalidCollectionIndex => "invalid collection index",
            Self::IndexExceedsMaximum => "collection index exceeds maximum",
            Self::TaggedEmbeddedField => "tagged embedded field",
            Self::UnsupportedFileDestination => "unsupported file destination",
            Self::UnknownScalarKind => "unknown scalar kind",
            Self::NestedOptional => "nested optional",
            Self::BodyTooLarge => "body too large",
            Self::Parse => "parse error",
            Self::Decode => "decode error",
            Self::Json => "json error",
            Self::Xml => "xml error",
            Self::Io => "io error",
            Self::MalformedRequest => "malformed request",
        };
        f.write_str(name)
    }
}

/// Error returned by a custom [`Decode`](crate::Decode) implementation.
///
/// Carries a message and, optionally, the underlying cause.
///
/// # Examples
///
/// ```
/// use request_binder::DecodeError;
///
/// let err = DecodeError::new("expected a hex colour");
/// assert_eq!(err.to_string(), "expected a hex colour");
///
/// let parse = "x".parse::<u8>().unwrap_err();
/// let err = DecodeError::from_source(parse);
/// assert!(std::error::Error::source(&err).is_some());
/// ```
#[derive(Debug)]
pub struct DecodeError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DecodeError {
    /// Creates a decode error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, reusing its message.
    pub fn from_source(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn unsupported(capability: &str) -> Self {
        Self::new(format!("{capability} decoding is not implemented"))
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_parse_errors_together() {
        let int: BindError = "x".parse::<i32>().unwrap_err().into();
        let float: BindError = "x".parse::<f64>().unwrap_err().into();
        let boolean: BindError = "x".parse::<bool>().unwrap_err().into();

        assert_eq!(int.kind(), BindErrorKind::Parse);
        assert_eq!(float.kind(), BindErrorKind::Parse);
        assert_eq!(boolean.kind(), BindErrorKind::Parse);
    }

    #[test]
    fn parse_errors_are_reported_verbatim() {
        let cause = "12a".parse::<u8>().unwrap_err();
        let err: BindError = cause.clone().into();
        assert_eq!(err.to_string(), cause.to_string());
    }

    #[test]
    fn declaration_errors_are_not_client_errors() {
        assert!(!BindErrorKind::TaggedEmbeddedField.is_client_error());
        assert!(!BindErrorKind::UnsupportedFileDestination.is_client_error());
        assert!(!BindErrorKind::NestedOptional.is_client_error());
        assert!(BindErrorKind::IndexExceedsMaximum.is_client_error());
        assert!(BindErrorKind::Parse.is_client_error());
    }

    #[test]
    fn index_error_names_field_and_bound() {
        let err = BindError::IndexExceedsMaximum {
            field: "elements".to_string(),
            index: 1001,
            max: 1000,
        };
        let message = err.to_string();
        assert!(message.contains("elements"));
        assert!(message.contains("1001"));
        assert!(message.contains("1000"));
    }

    #[test]
    fn decode_error_keeps_source() {
        let err = DecodeError::from_source("nope".parse::<i64>().unwrap_err());
        assert!(StdError::source(&err).is_some());
        assert!(DecodeError::new("plain").source().is_none());

        let wrapped: BindError = err.into();
        assert_eq!(wrapped.kind(), BindErrorKind::Decode);
    }

    #[test]
    fn kind_display() {
        assert_eq!(
            BindErrorKind::UnsupportedMediaType.to_string(),
            "unsupported media type"
        );
        assert_eq!(BindErrorKind::Parse.to_string(), "parse error");
    }
}
