//! Destination shape descriptors.
//!
//! Every bindable type declares its [`Shape`] once, through
//! [`Bindable::shape`](crate::Bindable::shape). The binding engine dispatches
//! on these descriptors instead of inspecting values at each step.

use std::fmt;

/// The closed set of destination shapes the engine knows how to fill.
///
/// Inner shapes are referenced through function pointers so descriptors stay
/// `Copy` and need no allocation.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// A leaf parsed from a single string.
    Scalar(ScalarKind),
    /// A record with tagged fields.
    Record,
    /// A string-keyed mapping.
    Mapping(MapValue),
    /// A list; `fixed` is the length of a fixed-size list.
    List {
        /// Shape of each element
        element: fn() -> Shape,
        /// Length of a fixed-size list, `None` for growable lists
        fixed: Option<usize>,
    },
    /// One level of optional indirection.
    Optional {
        /// Shape of the wrapped value
        inner: fn() -> Shape,
    },
    /// An uploaded file handle.
    File(FileHandle),
    /// A leaf with its own decoding capabilities.
    Custom(Capabilities),
}

impl Shape {
    /// Short, human-readable name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Scalar(_) => "scalar",
            Shape::Record => "record",
            Shape::Mapping(_) => "mapping",
            Shape::List { .. } => "list",
            Shape::Optional { .. } => "optional",
            Shape::File(_) => "file handle",
            Shape::Custom(_) => "custom decoder",
        }
    }

    /// Returns `true` for record shapes.
    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record)
    }

    /// Returns `true` for file-handle leaves.
    pub fn is_file(&self) -> bool {
        matches!(self, Shape::File(_))
    }

    /// Returns `true` for a file handle or an optional file handle.
    pub fn holds_file(&self) -> bool {
        match self {
            Shape::File(_) => true,
            Shape::Optional { inner } => inner().is_file(),
            _ => false,
        }
    }

    /// Strips one level of optional, reporting whether one was present.
    pub fn unwrap_optional(self) -> (Shape, bool) {
        match self {
            Shape::Optional { inner } => (inner(), true),
            other => (other, false),
        }
    }

    /// Classifies the shape as a file-handle destination.
    pub fn file_binding(&self) -> FileBinding {
        match self {
            Shape::File(_) => FileBinding::Bare,
            Shape::Optional { inner } if inner().is_file() => FileBinding::Supported,
            Shape::List { element, .. } if element().holds_file() => FileBinding::Supported,
            _ => FileBinding::NotFile,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => write!(f, "scalar ({kind})"),
            other => f.write_str(other.name()),
        }
    }
}

/// How a field's shape relates to uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBinding {
    /// Not a file destination.
    NotFile,
    /// An optional handle or a list of handles.
    Supported,
    /// A bare handle, which cannot represent a missing upload.
    Bare,
}

/// Scalar kind and bit width of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Signed integer of the given width.
    Int {
        /// Width in bits
        bits: u32,
    },
    /// Unsigned integer of the given width.
    Uint {
        /// Width in bits
        bits: u32,
    },
    /// Floating point number of the given width.
    Float {
        /// Width in bits
        bits: u32,
    },
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
}

impl ScalarKind {
    /// The literal an empty input is replaced with before parsing.
    pub fn zero_literal(self) -> &'static str {
        match self {
            ScalarKind::Int { .. } | ScalarKind::Uint { .. } => "0",
            ScalarKind::Float { .. } => "0.0",
            ScalarKind::Bool => "false",
            ScalarKind::String => "",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Int { bits } => write!(f, "i{bits}"),
            ScalarKind::Uint { bits } => write!(f, "u{bits}"),
            ScalarKind::Float { bits } => write!(f, "f{bits}"),
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::String => write!(f, "string"),
        }
    }
}

/// Element shape of a string-keyed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapValue {
    /// `String` elements, bound from the first value.
    String,
    /// `Vec<String>` elements, bound from all values.
    StringList,
    /// Uninterpreted `serde_json::Value` elements, bound from the first value.
    Value,
}

/// Storage of an uploaded-file leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileHandle {
    /// An owned `UploadedFile`.
    Value,
    /// A shared `Arc<UploadedFile>`.
    Shared,
}

/// Decoding capabilities a custom leaf exposes.
///
/// Declared once per type; the dispatcher tries them in the order
/// multi-value, single-value, text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Decodes the full ordered sequence of values for a key.
    pub params: bool,
    /// Decodes a single value.
    pub param: bool,
    /// Decodes the raw bytes of a single value.
    pub text: bool,
}

impl Capabilities {
    /// Only multi-value decoding.
    pub const PARAMS: Capabilities = Capabilities {
        params: true,
        param: false,
        text: false,
    };

    /// Only single-value decoding.
    pub const PARAM: Capabilities = Capabilities {
        params: false,
        param: true,
        text: false,
    };

    /// Only text decoding.
    pub const TEXT: Capabilities = Capabilities {
        params: false,
        param: false,
        text: true,
    };

    /// Returns `true` when any capability is present.
    pub fn any(self) -> bool {
        self.params || self.param || self.text
    }
}

/// Binding descriptor of one record field.
///
/// `tags` maps a source tag name (`"query"`, `"form"`, ...) to the external
/// key feeding the field. An empty key is treated as no tag.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Field name, used in diagnostics and to address the field.
    pub name: &'static str,
    /// Tag name → external key.
    pub tags: &'static [(&'static str, &'static str)],
    /// Whether the field is an embedded record.
    pub embedded: bool,
}

impl Field {
    /// Creates a plain field descriptor.
    pub const fn new(name: &'static str, tags: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            name,
            tags,
            embedded: false,
        }
    }

    /// Creates an embedded field descriptor.
    pub const fn embedded(
        name: &'static str,
        tags: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            tags,
            embedded: true,
        }
    }

    /// Returns the external key for `tag_name`, if the field is tagged.
    pub fn tag(&self, tag_name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == tag_name)
            .map(|(_, key)| *key)
            .filter(|key| !key.is_empty())
    }
}
