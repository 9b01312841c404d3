//! Projection of value and file maps onto a nested prefix.

use regex::Regex;

use super::notation;
use crate::source::{FileMap, ValueMap};

/// The data visible to one nested destination.
#[derive(Debug, Default)]
pub(crate) struct Projection {
    pub(crate) values: ValueMap,
    pub(crate) files: FileMap,
}

impl Projection {
    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty() && self.files.is_empty()
    }
}

/// Rekeys every entry under `prefix` by its canonical sub-key.
///
/// Entries whose keys resolve to the same sub-key are merged in key order.
pub(crate) fn project(
    prefix: &str,
    values: &ValueMap,
    files: &FileMap,
    pattern: &Regex,
    separator: &str,
) -> Projection {
    let mut projection = Projection::default();

    for (key, sub_key) in notation::resolve(prefix, values.keys(), pattern, separator) {
        if let Some(found) = values.get(key) {
            projection
                .values
                .entry(sub_key)
                .or_default()
                .extend(found.iter().cloned());
        }
    }

    for (key, sub_key) in notation::resolve(prefix, files.keys(), pattern, separator) {
        if let Some(found) = files.get(key) {
            projection
                .files
                .entry(sub_key)
                .or_default()
                .extend(found.iter().cloned());
        }
    }

    projection
}
