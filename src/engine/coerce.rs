//! String to scalar coercion.

use std::str::ParseBoolError;

use crate::decode;
use crate::error::BindError;
use crate::shape::Shape;
use crate::slot::{Scalar, Slot};

/// Parses `raw` into the scalar behind `slot`.
///
/// An empty string stores the zero value of the kind. One level of optional
/// is materialized first.
pub(crate) fn coerce(slot: &mut Slot<'_>, raw: &str) -> Result<(), BindError> {
    match slot {
        Slot::Scalar(scalar) => set_scalar(scalar, raw),
        Slot::Optional(optional) => {
            let mut inner = optional.materialize();
            if let Slot::Optional(_) = inner {
                return Err(BindError::NestedOptional);
            }
            coerce(&mut inner, raw)
        }
        other => Err(BindError::UnknownScalarKind {
            shape: other.shape().name(),
        }),
    }
}

/// Assigns one value to a leaf: a custom decoder when the leaf has one,
/// scalar coercion otherwise.
pub(crate) fn assign(slot: &mut Slot<'_>, value: &String) -> Result<(), BindError> {
    if decode_custom(slot, std::slice::from_ref(value))? {
        return Ok(());
    }
    coerce(slot, value)
}

/// Runs the custom decoder behind `slot`, looking through one optional.
///
/// Returns `Ok(false)` when the leaf has no applicable decoder.
pub(crate) fn decode_custom(slot: &mut Slot<'_>, values: &[String]) -> Result<bool, BindError> {
    match slot {
        Slot::Custom(capabilities, decoder) => {
            decode::dispatch(*capabilities, &mut **decoder, values)
        }
        Slot::Optional(optional) => {
            let (inner, _) = optional.optional_shape().unwrap_optional();
            if !matches!(inner, Shape::Custom(capabilities) if capabilities.any()) {
                return Ok(false);
            }
            let mut inner = optional.materialize();
            decode_custom(&mut inner, values)
        }
        _ => Ok(false),
    }
}

fn set_scalar(scalar: &mut Scalar<'_>, raw: &str) -> Result<(), BindError> {
    let raw = if raw.is_empty() {
        scalar.kind().zero_literal()
    } else {
        raw
    };

    match scalar {
        Scalar::I8(v) => **v = raw.parse()?,
        Scalar::I16(v) => **v = raw.parse()?,
        Scalar::I32(v) => **v = raw.parse()?,
        Scalar::I64(v) => **v = raw.parse()?,
        Scalar::Isize(v) => **v = raw.parse()?,
        Scalar::U8(v) => **v = raw.parse()?,
        Scalar::U16(v) => **v = raw.parse()?,
        Scalar::U32(v) => **v = raw.parse()?,
        Scalar::U64(v) => **v = raw.parse()?,
        Scalar::Usize(v) => **v = raw.parse()?,
        Scalar::F32(v) => **v = raw.parse()?,
        Scalar::F64(v) => **v = raw.parse()?,
        Scalar::Bool(v) => **v = parse_bool(raw)?,
        Scalar::String(v) => **v = raw.to_string(),
    }
    Ok(())
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, ParseBoolError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => other.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindErrorKind;
    use crate::Bindable;

    fn set<T: Bindable>(value: &mut T, raw: &str) -> Result<(), BindError> {
        coerce(&mut value.slot(), raw)
    }

    #[test]
    fn integers_respect_width() {
        let mut small = 0i8;
        set(&mut small, "-128").unwrap();
        assert_eq!(small, -128);

        let err = set(&mut small, "128").unwrap_err();
        assert_eq!(err.kind(), BindErrorKind::Parse);

        let mut unsigned = 0u16;
        assert!(set(&mut unsigned, "-1").is_err());
        set(&mut unsigned, "65535").unwrap();
        assert_eq!(unsigned, u16::MAX);
    }

    #[test]
    fn empty_string_is_zero_value() {
        let mut int = 7i64;
        set(&mut int, "").unwrap();
        assert_eq!(int, 0);

        let mut float = 1.5f64;
        set(&mut float, "").unwrap();
        assert_eq!(float, 0.0);

        let mut flag = true;
        set(&mut flag, "").unwrap();
        assert!(!flag);

        let mut text = "old".to_string();
        set(&mut text, "").unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn bool_aliases() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("tRUE").is_err());
    }

    #[test]
    fn optional_is_materialized() {
        let mut value: Option<u32> = None;
        set(&mut value, "42").unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn nested_optional_is_rejected() {
        let mut value: Option<Option<u32>> = None;
        let err = set(&mut value, "1").unwrap_err();
        assert!(matches!(err, BindError::NestedOptional));
    }

    #[test]
    fn non_scalar_is_rejected() {
        let mut list: Vec<u32> = Vec::new();
        let err = set(&mut list, "1").unwrap_err();
        assert!(matches!(err, BindError::UnknownScalarKind { shape: "list" }));
    }

    #[test]
    fn floats_parse() {
        let mut value = 0f32;
        set(&mut value, "2.5").unwrap();
        assert_eq!(value, 2.5);
        assert!(set(&mut value, "abc").is_err());
    }

    mod proptests {
        use super::*;
        use crate::test_utils::arb_value;
        use proptest::prelude::*;

        proptest! {
            /// Property: integers survive formatting and coercion unchanged
            #[test]
            fn proptest_i64_coercion_matches_display(n in any::<i64>()) {
                let mut value = 0i64;
                set(&mut value, &n.to_string()).expect("formatted integer parses");
                prop_assert_eq!(value, n);
            }

            /// Property: strings are stored verbatim
            #[test]
            fn proptest_strings_are_verbatim(input in arb_value(64)) {
                let mut value = String::from("previous");
                set(&mut value, &input).expect("strings always coerce");
                prop_assert_eq!(value, input);
            }

            /// Property: coercion into a bool fails or yields the documented alias
            #[test]
            fn proptest_bool_never_panics(input in arb_value(8)) {
                let mut value = false;
                match set(&mut value, &input) {
                    Ok(()) => prop_assert!(input.is_empty() || parse_bool(&input).is_ok()),
                    Err(err) => prop_assert_eq!(err.kind(), BindErrorKind::Parse),
                }
            }
        }
    }
}
