//! Mutable handles onto destination values.
//!
//! [`Bindable`] is implemented by everything the engine can fill. It pairs a
//! static [`Shape`] with a [`Slot`]: a typed, mutable view the engine writes
//! through. Records, lists and optionals are reached through small object
//! safe traits so the engine can recurse without knowing concrete types.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::body::BodyTarget;
use crate::decode::Decode;
use crate::file::UploadedFile;
use crate::shape::{Capabilities, Field, FileHandle, MapValue, ScalarKind, Shape};
use crate::source::ValueMap;

/// A value the binding engine can write into.
///
/// Implemented for the scalar types, `String`, `Vec<T>`, `[T; N]`,
/// `Option<T>`, the supported string-keyed maps, and uploaded files.
/// Records implement it through [`bindable!`](crate::bindable) and custom
/// leaves through [`decodable!`](crate::decodable).
pub trait Bindable {
    /// The static shape of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// A mutable handle onto this value.
    fn slot(&mut self) -> Slot<'_>;

    /// Where JSON and XML bodies decode into, if this type accepts them.
    fn body_target(&mut self) -> Option<&mut dyn BodyTarget> {
        None
    }
}

/// A mutable handle onto one destination value, tagged with its shape.
pub enum Slot<'a> {
    /// A scalar leaf.
    Scalar(Scalar<'a>),
    /// A record with tagged fields.
    Record(&'a mut dyn Record),
    /// A string-keyed mapping.
    Mapping(Mapping<'a>),
    /// A fixed or growable list.
    List(&'a mut dyn ListSlot),
    /// One level of optional indirection.
    Optional(&'a mut dyn OptionalSlot),
    /// An uploaded-file leaf.
    File(FileSlot<'a>),
    /// A leaf with its own decoders.
    Custom(Capabilities, &'a mut dyn Decode),
}

impl Slot<'_> {
    /// The shape of the value behind this slot.
    pub fn shape(&self) -> Shape {
        match self {
            Slot::Scalar(scalar) => Shape::Scalar(scalar.kind()),
            Slot::Record(_) => Shape::Record,
            Slot::Mapping(mapping) => Shape::Mapping(mapping.value()),
            Slot::List(list) => list.list_shape(),
            Slot::Optional(optional) => optional.optional_shape(),
            Slot::File(file) => Shape::File(file.handle()),
            Slot::Custom(capabilities, _) => Shape::Custom(*capabilities),
        }
    }
}

/// A record whose fields can be addressed by descriptor.
///
/// Usually generated by [`bindable!`](crate::bindable).
pub trait Record {
    /// Binding descriptors of the record's fields, in declaration order.
    fn fields(&self) -> &'static [Field];

    /// A handle onto the field described by `field`.
    ///
    /// `None` marks a field that cannot be assigned; the engine skips it.
    fn field_mut(&mut self, field: &Field) -> Option<Slot<'_>>;
}

/// A list the engine can size and fill element by element.
pub trait ListSlot {
    /// The shape of the list type.
    fn list_shape(&self) -> Shape;

    /// Current number of elements.
    fn len(&self) -> usize;

    /// Returns `true` when the list has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of a fixed-size list, `None` when the list can grow.
    fn fixed_len(&self) -> Option<usize>;

    /// Grows the list to at least `len` elements, keeping existing ones.
    fn grow(&mut self, len: usize);

    /// Replaces the contents with `len` default elements.
    fn reset(&mut self, len: usize);

    /// A handle onto the element at `index`.
    fn element_mut(&mut self, index: usize) -> Option<Slot<'_>>;
}

/// One level of optional indirection.
pub trait OptionalSlot {
    /// The shape of the optional type.
    fn optional_shape(&self) -> Shape;

    /// Whether a value is present.
    fn is_present(&self) -> bool;

    /// A handle onto the value, materializing a default one if absent.
    fn materialize(&mut self) -> Slot<'_>;

    /// A handle onto the value, if present.
    fn present_mut(&mut self) -> Option<Slot<'_>>;
}

/// A mutable scalar leaf.
#[allow(missing_docs)]
pub enum Scalar<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    String(&'a mut String),
}

impl Scalar<'_> {
    /// Kind and width of the leaf.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::I8(_) => ScalarKind::Int { bits: 8 },
            Scalar::I16(_) => ScalarKind::Int { bits: 16 },
            Scalar::I32(_) => ScalarKind::Int { bits: 32 },
            Scalar::I64(_) => ScalarKind::Int { bits: 64 },
            Scalar::Isize(_) => ScalarKind::Int { bits: isize::BITS },
            Scalar::U8(_) => ScalarKind::Uint { bits: 8 },
            Scalar::U16(_) => ScalarKind::Uint { bits: 16 },
            Scalar::U32(_) => ScalarKind::Uint { bits: 32 },
            Scalar::U64(_) => ScalarKind::Uint { bits: 64 },
            Scalar::Usize(_) => ScalarKind::Uint { bits: usize::BITS },
            Scalar::F32(_) => ScalarKind::Float { bits: 32 },
            Scalar::F64(_) => ScalarKind::Float { bits: 64 },
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::String(_) => ScalarKind::String,
        }
    }
}

/// A mutable string-keyed mapping.
pub enum Mapping<'a> {
    /// Bound from the first value of each key.
    Strings(&'a mut HashMap<String, String>),
    /// Bound from all values of each key.
    Lists(&'a mut HashMap<String, Vec<String>>),
    /// Bound from the first value of each key, as a JSON string.
    Values(&'a mut HashMap<String, Value>),
}

impl Mapping<'_> {
    /// Element shape of the mapping.
    pub fn value(&self) -> MapValue {
        match self {
            Mapping::Strings(_) => MapValue::String,
            Mapping::Lists(_) => MapValue::StringList,
            Mapping::Values(_) => MapValue::Value,
        }
    }

    /// Inserts every key of `data`, following the element shape rule.
    pub(crate) fn populate(&mut self, data: &ValueMap) {
        for (key, values) in data {
            let Some(first) = values.first() else {
                continue;
            };
            match self {
                Mapping::Strings(map) => {
                    map.insert(key.clone(), first.clone());
                }
                Mapping::Lists(map) => {
                    map.insert(key.clone(), values.clone());
                }
                // Only the first value is kept for uninterpreted elements.
                Mapping::Values(map) => {
                    map.insert(key.clone(), Value::String(first.clone()));
                }
            }
        }
    }
}

/// A mutable uploaded-file leaf.
pub enum FileSlot<'a> {
    /// An owned file.
    Value(&'a mut UploadedFile),
    /// A shared file.
    Shared(&'a mut Arc<UploadedFile>),
}

impl FileSlot<'_> {
    /// Storage of the leaf.
    pub fn handle(&self) -> FileHandle {
        match self {
            FileSlot::Value(_) => FileHandle::Value,
            FileSlot::Shared(_) => FileHandle::Shared,
        }
    }

    pub(crate) fn assign(&mut self, file: &Arc<UploadedFile>) {
        match self {
            FileSlot::Value(slot) => **slot = UploadedFile::clone(file),
            FileSlot::Shared(slot) => **slot = Arc::clone(file),
        }
    }
}

macro_rules! scalar_bindable {
    ($($ty:ty => $variant:ident ($kind:expr)),+ $(,)?) => {
        $(
            impl Bindable for $ty {
                fn shape() -> Shape {
                    Shape::Scalar($kind)
                }

                fn slot(&mut self) -> Slot<'_> {
                    Slot::Scalar(Scalar::$variant(self))
                }
            }
        )+
    };
}

scalar_bindable! {
    i8 => I8(ScalarKind::Int { bits: 8 }),
    i16 => I16(ScalarKind::Int { bits: 16 }),
    i32 => I32(ScalarKind::Int { bits: 32 }),
    i64 => I64(ScalarKind::Int { bits: 64 }),
    isize => Isize(ScalarKind::Int { bits: isize::BITS }),
    u8 => U8(ScalarKind::Uint { bits: 8 }),
    u16 => U16(ScalarKind::Uint { bits: 16 }),
    u32 => U32(ScalarKind::Uint { bits: 32 }),
    u64 => U64(ScalarKind::Uint { bits: 64 }),
    usize => Usize(ScalarKind::Uint { bits: usize::BITS }),
    f32 => F32(ScalarKind::Float { bits: 32 }),
    f64 => F64(ScalarKind::Float { bits: 64 }),
    bool => Bool(ScalarKind::Bool),
    String => String(ScalarKind::String),
}

impl<T: Bindable + Default> Bindable for Vec<T> {
    fn shape() -> Shape {
        Shape::List {
            element: T::shape,
            fixed: None,
        }
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::List(self)
    }
}

impl<T: Bindable + Default> ListSlot for Vec<T> {
    fn list_shape(&self) -> Shape {
        <Self as Bindable>::shape()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn grow(&mut self, len: usize) {
        if Vec::len(self) < len {
            self.resize_with(len, T::default);
        }
    }

    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }

    fn element_mut(&mut self, index: usize) -> Option<Slot<'_>> {
        self.get_mut(index).map(|element| element.slot())
    }
}

impl<T: Bindable + Default, const N: usize> Bindable for [T; N] {
    fn shape() -> Shape {
        Shape::List {
            element: T::shape,
            fixed: Some(N),
        }
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::List(self)
    }
}

impl<T: Bindable + Default, const N: usize> ListSlot for [T; N] {
    fn list_shape(&self) -> Shape {
        <Self as Bindable>::shape()
    }

    fn len(&self) -> usize {
        N
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn grow(&mut self, _len: usize) {}

    fn reset(&mut self, _len: usize) {
        for element in self.iter_mut() {
            *element = T::default();
        }
    }

    fn element_mut(&mut self, index: usize) -> Option<Slot<'_>> {
        self.get_mut(index).map(|element| element.slot())
    }
}

impl<T: Bindable + Default> Bindable for Option<T> {
    fn shape() -> Shape {
        Shape::Optional { inner: T::shape }
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Optional(self)
    }
}

impl<T: Bindable + Default> OptionalSlot for Option<T> {
    fn optional_shape(&self) -> Shape {
        <Self as Bindable>::shape()
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn materialize(&mut self) -> Slot<'_> {
        self.get_or_insert_with(T::default).slot()
    }

    fn present_mut(&mut self) -> Option<Slot<'_>> {
        self.as_mut().map(|value| value.slot())
    }
}

impl Bindable for HashMap<String, String> {
    fn shape() -> Shape {
        Shape::Mapping(MapValue::String)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Mapping(Mapping::Strings(self))
    }

    fn body_target(&mut self) -> Option<&mut dyn BodyTarget> {
        Some(self)
    }
}

impl Bindable for HashMap<String, Vec<String>> {
    fn shape() -> Shape {
        Shape::Mapping(MapValue::StringList)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Mapping(Mapping::Lists(self))
    }

    fn body_target(&mut self) -> Option<&mut dyn BodyTarget> {
        Some(self)
    }
}

impl Bindable for HashMap<String, Value> {
    fn shape() -> Shape {
        Shape::Mapping(MapValue::Value)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Mapping(Mapping::Values(self))
    }

    fn body_target(&mut self) -> Option<&mut dyn BodyTarget> {
        Some(self)
    }
}

impl Bindable for UploadedFile {
    fn shape() -> Shape {
        Shape::File(FileHandle::Value)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::File(FileSlot::Value(self))
    }
}

impl Bindable for Arc<UploadedFile> {
    fn shape() -> Shape {
        Shape::File(FileHandle::Shared)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::File(FileSlot::Shared(self))
    }
}
