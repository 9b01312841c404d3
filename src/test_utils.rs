//! Shared proptest strategies for unit tests.

use proptest::prelude::*;

use crate::source::ValueMap;

/// A field key: lowercase identifier characters, never empty.
pub(crate) fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").unwrap()
}

/// A request value of printable ASCII, possibly empty.
pub(crate) fn arb_value(max_len: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[ -~]{{0,{max_len}}}")).unwrap()
}

/// A value map with up to `max_keys` keys of one to three values each.
pub(crate) fn arb_value_map(max_keys: usize) -> impl Strategy<Value = ValueMap> {
    prop::collection::btree_map(
        arb_key(),
        prop::collection::vec(arb_value(16), 1..=3),
        0..=max_keys,
    )
}
