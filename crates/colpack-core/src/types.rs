//! Shared vocabulary of the column contract: row ids, element types,
//! encodings and the column identity.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based logical row identifier within a column.
///
/// TIDs are positional: inserting or removing a row shifts every later TID.
pub type Tid = usize;

/// Ordered collection of TIDs used by bulk update and remove.
pub type PositionList = Vec<Tid>;

/// Element type a column is bound to for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit IEEE-754 float.
    Float32,
    /// 64-bit IEEE-754 float.
    Float64,
    /// Boolean.
    Bool,
    /// Variable-length UTF-8 string.
    Varchar,
}

impl ElementType {
    /// All element types, in tag order.
    pub const ALL: [ElementType; 8] = [
        Self::Int32,
        Self::Int64,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Bool,
        Self::Varchar,
    ];

    /// Stable one-byte tag written into stream headers.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Int32 => 1,
            Self::Int64 => 2,
            Self::UInt32 => 3,
            Self::UInt64 => 4,
            Self::Float32 => 5,
            Self::Float64 => 6,
            Self::Bool => 7,
            Self::Varchar => 8,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Lowercase name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Varchar => "varchar",
        }
    }

    /// Returns false for types whose values own heap memory.
    #[must_use]
    pub const fn is_fixed_width(self) -> bool {
        !matches!(self, Self::Varchar)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compression scheme of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Successive differences, decoded by prefix sum.
    Delta,
    /// Integer codes plus a value/code table.
    Dictionary,
    /// (value, run length) pairs.
    RunLength,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delta => "delta",
            Self::Dictionary => "dictionary",
            Self::RunLength => "run-length",
        })
    }
}

/// Name and element type of a column, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnIdentity {
    name: String,
    element_type: ElementType,
}

impl ColumnIdentity {
    /// Creates a column identity.
    ///
    /// The name doubles as the stream file name, so it must be non-empty and
    /// must not contain a path separator or be a relative path component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColumnName`] when the name cannot be used.
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Result<Self> {
        let name = name.into();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(&['/', '\\', '\0'][..])
        {
            return Err(Error::InvalidColumnName(name));
        }
        Ok(Self { name, element_type })
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type of the column.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}
