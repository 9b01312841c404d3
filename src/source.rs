//! Request data sources and the maps they produce.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::BinderConfig;
use crate::file::UploadedFile;

/// Multi-valued string map: key → ordered values.
///
/// Sorted by key, so scans over the keys are deterministic.
pub type ValueMap = BTreeMap<String, Vec<String>>;

/// Uploaded files by form field name.
pub type FileMap = BTreeMap<String, Vec<Arc<UploadedFile>>>;

/// One origin of request data.
///
/// Each source reads its own tag from the destination's field descriptors
/// and has a fixed rank in the binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingSource {
    /// Route path parameters
    Path,
    /// URL query parameters
    Query,
    /// Request headers
    Header,
    /// URL-encoded or multipart form body
    Form,
}

impl BindingSource {
    /// All sources, lowest precedence first.
    pub const ALL: [BindingSource; 4] = [
        BindingSource::Path,
        BindingSource::Query,
        BindingSource::Header,
        BindingSource::Form,
    ];

    /// The tag name this source reads, as configured.
    pub fn tag<'c>(self, config: &'c BinderConfig) -> &'c str {
        match self {
            BindingSource::Path => config.path_tag(),
            BindingSource::Query => config.query_tag(),
            BindingSource::Header => config.header_tag(),
            BindingSource::Form => config.form_tag(),
        }
    }

    /// Precedence rank; a higher rank overwrites a lower one.
    pub fn precedence(self) -> u8 {
        match self {
            BindingSource::Path => 0,
            BindingSource::Query => 1,
            BindingSource::Header => 2,
            BindingSource::Form => 3,
        }
    }

    /// Whether an incompatible destination is silently ignored.
    ///
    /// Path, query and header data aimed at a non-record destination most
    /// likely belongs to the body, so those sources skip it.
    pub fn tolerates_incompatible_destination(self) -> bool {
        !matches!(self, BindingSource::Form)
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingSource::Path => write!(f, "path"),
            BindingSource::Query => write!(f, "query"),
            BindingSource::Header => write!(f, "header"),
            BindingSource::Form => write!(f, "form"),
        }
    }
}

/// Returns the values stored under `key`, falling back to the first
/// case-insensitive match.
pub(crate) fn lookup<'a>(data: &'a ValueMap, key: &str) -> Option<&'a Vec<String>> {
    data.get(key).or_else(|| {
        data.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, values)| values)
    })
}
