//! Key notation resolution.
//!
//! Nested fields are addressed in external keys with dot paths
//! (`user.address.city`) or bracket groups (`user[address][city]`,
//! `tags[0]`, `meta[colour]`). Resolution filters a key set down to the keys
//! under one prefix and rewrites them into the canonical dot-separated
//! sub-key the nested binder understands.

use std::collections::BTreeMap;

use regex::Regex;

/// Resolves every key of `keys` that belongs to `prefix`.
///
/// Returns original key → canonical sub-key. Keys that do not belong to the
/// prefix are absent from the result.
pub(crate) fn resolve<'k>(
    prefix: &str,
    keys: impl IntoIterator<Item = &'k String>,
    pattern: &Regex,
    separator: &str,
) -> BTreeMap<&'k str, String> {
    keys.into_iter()
        .filter_map(|key| {
            resolve_key(prefix, key, pattern, separator).map(|sub_key| (key.as_str(), sub_key))
        })
        .collect()
}

/// Rewrites a single key, or returns `None` when it is not under `prefix`.
///
/// `prefix.rest` becomes `rest`. `prefix[a][b]` becomes `a.b`; anything
/// after the groups the pattern accepts is kept in separator form
/// (`prefix[0].name` and `prefix[0][name]` both become `0.name`).
pub(crate) fn resolve_key(
    prefix: &str,
    key: &str,
    pattern: &Regex,
    separator: &str,
) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }

    if !separator.is_empty() {
        if let Some(sub_key) = rest.strip_prefix(separator) {
            return (!sub_key.is_empty()).then(|| sub_key.to_string());
        }
    }

    let mut groups = Vec::new();
    let mut pos = 0;
    while pos < rest.len() {
        let Some(captures) = pattern.captures_at(rest, pos) else {
            break;
        };
        let Some(whole) = captures.get(0) else {
            break;
        };
        if whole.start() != pos || whole.is_empty() {
            break;
        }
        let group = captures.get(1).map_or("", |m| m.as_str());
        if group.is_empty() {
            return None;
        }
        groups.push(group);
        pos = whole.end();
    }

    if groups.is_empty() {
        return None;
    }

    let mut sub_key = groups.join(separator);
    sub_key.push_str(&normalize_tail(&rest[pos..], separator)?);
    Some(sub_key)
}

/// Rewrites what follows the prefix's bracket groups: leading `[segment]`
/// groups become `separator + segment`, and the remainder must start with
/// the separator.
fn normalize_tail(mut tail: &str, separator: &str) -> Option<String> {
    let mut normalized = String::new();
    while let Some(inner) = tail.strip_prefix('[') {
        let (segment, after) = inner.split_once(']')?;
        if segment.is_empty() || separator.is_empty() {
            return None;
        }
        normalized.push_str(separator);
        normalized.push_str(segment);
        tail = after;
    }
    if !tail.is_empty() && (separator.is_empty() || !tail.starts_with(separator)) {
        return None;
    }
    normalized.push_str(tail);
    Some(normalized)
}

/// Splits a canonical sub-key into its first segment and the remainder.
pub(crate) fn split_first<'k>(sub_key: &'k str, separator: &str) -> (&'k str, Option<&'k str>) {
    if separator.is_empty() {
        return (sub_key, None);
    }
    match sub_key.split_once(separator) {
        Some((head, rest)) => (head, Some(rest)),
        None => (sub_key, None),
    }
}
