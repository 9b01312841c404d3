//! Destination-supplied decoders.
//!
//! A type that wants full control over how request strings become values
//! implements [`Decode`] and registers itself with [`decodable!`]. The
//! capabilities it declares are attached to its [`Shape`](crate::Shape)
//! once, so the engine never looks them up at bind time.

use crate::error::{BindError, DecodeError};
use crate::shape::Capabilities;

/// Custom decoding of request values.
///
/// Implement the methods matching the declared [`Capabilities`]; the others
/// keep their default, which reports the capability as missing.
///
/// # Examples
///
/// ```
/// use request_binder::{decodable, Capabilities, Decode, DecodeError};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Tags(Vec<String>);
///
/// impl Decode for Tags {
///     fn capabilities() -> Capabilities {
///         Capabilities::PARAMS
///     }
///
///     fn decode_params(&mut self, params: &[String]) -> Result<(), DecodeError> {
///         self.0 = params.iter().map(|p| p.to_uppercase()).collect();
///         Ok(())
///     }
/// }
///
/// decodable!(Tags);
/// ```
pub trait Decode {
    /// The capabilities this type implements.
    fn capabilities() -> Capabilities
    where
        Self: Sized;

    /// Decodes every value supplied for a key, in order.
    fn decode_params(&mut self, params: &[String]) -> Result<(), DecodeError> {
        let _ = params;
        Err(DecodeError::unsupported("multi-value"))
    }

    /// Decodes a single value.
    fn decode_param(&mut self, param: &str) -> Result<(), DecodeError> {
        let _ = param;
        Err(DecodeError::unsupported("single-value"))
    }

    /// Decodes the raw bytes of a single value.
    fn decode_text(&mut self, text: &[u8]) -> Result<(), DecodeError> {
        let _ = text;
        Err(DecodeError::unsupported("text"))
    }
}

/// Runs the first applicable decoder against `values`.
///
/// Order: multi-value with the whole sequence, single-value with the first
/// value, text with the first value's bytes. Returns `Ok(false)` when no
/// capability applies.
pub(crate) fn dispatch(
    capabilities: Capabilities,
    decoder: &mut dyn Decode,
    values: &[String],
) -> Result<bool, BindError> {
    if capabilities.params {
        decoder.decode_params(values)?;
        return Ok(true);
    }
    let Some(first) = values.first() else {
        return Ok(false);
    };
    if capabilities.param {
        decoder.decode_param(first)?;
        return Ok(true);
    }
    if capabilities.text {
        decoder.decode_text(first.as_bytes())?;
        return Ok(true);
    }
    Ok(false)
}

/// Implements [`Bindable`](crate::Bindable) for a type implementing
/// [`Decode`], exposing it as a custom leaf.
#[macro_export]
macro_rules! decodable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Bindable for $ty {
                fn shape() -> $crate::Shape {
                    $crate::Shape::Custom(<$ty as $crate::Decode>::capabilities())
                }

                fn slot(&mut self) -> $crate::Slot<'_> {
                    $crate::Slot::Custom(<$ty as $crate::Decode>::capabilities(), self)
                }
            }
        )+
    };
}
