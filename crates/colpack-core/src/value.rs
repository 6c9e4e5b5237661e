//! Boxed values and the per-element-type capability set.
//!
//! [`Value`] is the dynamically typed box used at the column boundary when
//! the caller does not know the element type statically. Codecs themselves
//! are generic over [`ColumnElement`]; the box is only unpacked at the edge,
//! once per call, before any physical state is touched.

use crate::error::{Error, Result};
use crate::types::ElementType;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// A single dynamically typed value, or nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The box carries no value.
    #[default]
    Empty,
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Varchar(String),
}

impl Value {
    /// Element type of the boxed value, `None` when empty.
    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Self::Empty => None,
            Self::Int32(_) => Some(ElementType::Int32),
            Self::Int64(_) => Some(ElementType::Int64),
            Self::UInt32(_) => Some(ElementType::UInt32),
            Self::UInt64(_) => Some(ElementType::UInt64),
            Self::Float32(_) => Some(ElementType::Float32),
            Self::Float64(_) => Some(ElementType::Float64),
            Self::Bool(_) => Some(ElementType::Bool),
            Self::Varchar(_) => Some(ElementType::Varchar),
        }
    }

    /// Returns true if the box carries no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Varchar(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Varchar(v.to_string())
    }
}

/// Operations every element type provides to the codecs.
///
/// This is the closed capability set the column framework relies on: the
/// element type is chosen once, at column creation, and never inspected at
/// call time except when unpacking a [`Value`].
pub trait ColumnElement:
    Clone + PartialEq + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Element type tag of this Rust type.
    const ELEMENT_TYPE: ElementType;

    /// Hashable identity used as the dictionary key.
    type Key: Hash + Eq + Clone + fmt::Debug + Send + Sync;

    /// Boxes the value.
    fn into_value(self) -> Value;

    /// Unboxes a value of this element type.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyValue`] for an empty box, [`Error::TypeMismatch`] for a
    /// box of another element type.
    fn from_value(value: &Value) -> Result<Self>;

    /// Dictionary key of the value.
    fn key(&self) -> Self::Key;

    /// Bitwise identity; floats compare by bit pattern.
    fn is_same(&self, other: &Self) -> bool;

    /// Heap bytes owned by the value, `None` for fixed-width types.
    fn heap_footprint(&self) -> Option<usize> {
        None
    }
}

/// Element types that can be stored as successive differences.
///
/// `apply_delta(prev, delta_from(v, prev)) == v` holds for every pair,
/// including at the numeric limits.
pub trait DeltaElement: ColumnElement + Copy + Default {
    /// Difference `self - previous`.
    #[must_use]
    fn delta_from(self, previous: Self) -> Self;

    /// Sum `self + delta`.
    #[must_use]
    fn apply_delta(self, delta: Self) -> Self;
}

fn mismatch(expected: ElementType, value: &Value) -> Error {
    match value.element_type() {
        Some(actual) => Error::TypeMismatch { expected, actual },
        None => Error::EmptyValue,
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }

        impl ColumnElement for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            type Key = $ty;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(mismatch(Self::ELEMENT_TYPE, other)),
                }
            }

            fn key(&self) -> Self::Key {
                *self
            }

            fn is_same(&self, other: &Self) -> bool {
                self == other
            }
        }

        impl DeltaElement for $ty {
            fn delta_from(self, previous: Self) -> Self {
                self.wrapping_sub(previous)
            }

            fn apply_delta(self, delta: Self) -> Self {
                self.wrapping_add(delta)
            }
        }
    };
}

impl_integer_element!(i32, Int32);
impl_integer_element!(i64, Int64);
impl_integer_element!(u32, UInt32);
impl_integer_element!(u64, UInt64);

// Float deltas are taken over the IEEE-754 bit patterns so decoding is exact.
macro_rules! impl_float_element {
    ($ty:ty, $bits:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }

        impl ColumnElement for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            type Key = $bits;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(mismatch(Self::ELEMENT_TYPE, other)),
                }
            }

            fn key(&self) -> Self::Key {
                self.to_bits()
            }

            fn is_same(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits()
            }
        }

        impl DeltaElement for $ty {
            fn delta_from(self, previous: Self) -> Self {
                <$ty>::from_bits(self.to_bits().wrapping_sub(previous.to_bits()))
            }

            fn apply_delta(self, delta: Self) -> Self {
                <$ty>::from_bits(self.to_bits().wrapping_add(delta.to_bits()))
            }
        }
    };
}

impl_float_element!(f32, u32, Float32);
impl_float_element!(f64, u64, Float64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl ColumnElement for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;
    type Key = bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(Self::ELEMENT_TYPE, other)),
        }
    }

    fn key(&self) -> Self::Key {
        *self
    }

    fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Varchar(v)
    }
}

impl ColumnElement for String {
    const ELEMENT_TYPE: ElementType = ElementType::Varchar;
    type Key = String;

    fn into_value(self) -> Value {
        Value::Varchar(self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v.clone()),
            other => Err(mismatch(Self::ELEMENT_TYPE, other)),
        }
    }

    fn key(&self) -> Self::Key {
        self.clone()
    }

    fn is_same(&self, other: &Self) -> bool {
        self == other
    }

    fn heap_footprint(&self) -> Option<usize> {
        Some(self.capacity())
    }
}
