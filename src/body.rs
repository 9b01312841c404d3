//! Structured body delegates.
//!
//! JSON and XML bodies are decoded with serde rather than through field
//! tags. A destination opts in by handing out a [`BodyTarget`] from
//! [`Bindable::body_target`](crate::Bindable::body_target); records do so
//! when declared with `#[serde]` in [`bindable!`](crate::bindable).

mod xml;

use std::io::{BufReader, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::BindError;

/// A destination that structured bodies can be decoded into.
///
/// Implemented for every `Serialize + DeserializeOwned` type. The body
/// delegates read the destination's current value through it so that
/// fields a body does not mention keep what earlier stages bound.
pub trait BodyTarget {
    /// The current value as a JSON document.
    fn to_json(&self) -> Result<Value, BindError>;

    /// Replaces the value with one decoded from a JSON document.
    fn replace_with_json(&mut self, document: Value) -> Result<(), BindError>;

    /// Replaces the value with one decoded from an XML document.
    fn replace_with_xml(&mut self, document: &str) -> Result<(), BindError>;
}

impl<T> BodyTarget for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_json(&self) -> Result<Value, BindError> {
        Ok(serde_json::to_value(self)?)
    }

    fn replace_with_json(&mut self, document: Value) -> Result<(), BindError> {
        *self = serde_json::from_value(document)?;
        Ok(())
    }

    fn replace_with_xml(&mut self, document: &str) -> Result<(), BindError> {
        *self = quick_xml::de::from_str(document)?;
        Ok(())
    }
}

/// Decodes a structured request body onto a destination.
///
/// The binder holds one delegate for JSON and one for XML bodies; both can
/// be replaced through [`Binder::with_body_decoders`](crate::Binder::with_body_decoders).
pub trait BodyDecoder {
    /// Reads `body` and writes the result into `dest`.
    fn decode(&self, body: &mut dyn Read, dest: &mut dyn BodyTarget) -> Result<(), BindError>;
}

/// JSON delegate backed by `serde_json`.
///
/// The parsed document is merged over the destination's current value, so
/// fields absent from the body keep what path and query binding wrote.
/// Objects merge key by key; any other value replaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody;

impl BodyDecoder for JsonBody {
    fn decode(&self, body: &mut dyn Read, dest: &mut dyn BodyTarget) -> Result<(), BindError> {
        let incoming: Value = serde_json::from_reader(body)?;
        let mut current = dest.to_json()?;
        merge(&mut current, incoming);
        dest.replace_with_json(current)
    }
}

fn merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}

/// XML delegate backed by `quick-xml`.
///
/// The document is merged element by element over the destination's
/// current value: elements present in the body replace (or, for records,
/// merge into) their counterparts, absent elements are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlBody;

impl BodyDecoder for XmlBody {
    fn decode(&self, body: &mut dyn Read, dest: &mut dyn BodyTarget) -> Result<(), BindError> {
        let incoming = xml::Element::parse(BufReader::new(body))?;
        let document = match xml::Element::from_json(&dest.to_json()?) {
            Some(mut current) => {
                current.merge(incoming);
                current.to_document()?
            }
            // Not a record: nothing to merge into.
            None => incoming.to_document()?,
        };
        dest.replace_with_xml(&document)
    }
}
