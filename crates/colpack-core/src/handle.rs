//! Type-erased column handle.
//!
//! The element type and codec are chosen once, in [`ColumnHandle::create`].
//! Afterwards every call dispatches on the enum variant to a boxed codec of
//! the matching element type; the boxed [`Value`] is unpacked there, once per
//! call.

use crate::column::{CompressedColumn, CompressionStats};
use crate::compression::{DeltaColumn, DictionaryColumn, RleColumn};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::types::{ColumnIdentity, ElementType, Encoding, Tid};
use crate::value::{ColumnElement, DeltaElement, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

type Boxed<T> = Box<dyn CompressedColumn<Element = T>>;

/// A compressed column of any supported element type.
#[derive(Debug)]
pub enum ColumnHandle {
    /// Column of `i32`.
    Int32(Boxed<i32>),
    /// Column of `i64`.
    Int64(Boxed<i64>),
    /// Column of `u32`.
    UInt32(Boxed<u32>),
    /// Column of `u64`.
    UInt64(Boxed<u64>),
    /// Column of `f32`.
    Float32(Boxed<f32>),
    /// Column of `f64`.
    Float64(Boxed<f64>),
    /// Column of `bool`.
    Bool(Boxed<bool>),
    /// Column of strings.
    Varchar(Boxed<String>),
}

macro_rules! dispatch {
    ($handle:expr, $col:ident => $body:expr) => {
        match $handle {
            ColumnHandle::Int32($col) => $body,
            ColumnHandle::Int64($col) => $body,
            ColumnHandle::UInt32($col) => $body,
            ColumnHandle::UInt64($col) => $body,
            ColumnHandle::Float32($col) => $body,
            ColumnHandle::Float64($col) => $body,
            ColumnHandle::Bool($col) => $body,
            ColumnHandle::Varchar($col) => $body,
        }
    };
}

macro_rules! map_variant {
    ($handle:expr, $col:ident => $body:expr) => {
        match $handle {
            ColumnHandle::Int32($col) => ColumnHandle::Int32($body),
            ColumnHandle::Int64($col) => ColumnHandle::Int64($body),
            ColumnHandle::UInt32($col) => ColumnHandle::UInt32($body),
            ColumnHandle::UInt64($col) => ColumnHandle::UInt64($body),
            ColumnHandle::Float32($col) => ColumnHandle::Float32($body),
            ColumnHandle::Float64($col) => ColumnHandle::Float64($body),
            ColumnHandle::Bool($col) => ColumnHandle::Bool($body),
            ColumnHandle::Varchar($col) => ColumnHandle::Varchar($body),
        }
    };
}

fn numeric<T: DeltaElement>(
    identity: ColumnIdentity,
    encoding: Encoding,
    config: &CodecConfig,
) -> Result<Boxed<T>> {
    let column: Boxed<T> = match encoding {
        Encoding::Delta => Box::new(DeltaColumn::<T>::with_config(identity, config)?),
        Encoding::Dictionary => Box::new(DictionaryColumn::<T>::with_config(identity, config)?),
        Encoding::RunLength => Box::new(RleColumn::<T>::with_config(identity, config)?),
    };
    Ok(column)
}

fn non_numeric<T: ColumnElement>(
    identity: ColumnIdentity,
    encoding: Encoding,
    config: &CodecConfig,
) -> Result<Boxed<T>> {
    let column: Boxed<T> = match encoding {
        Encoding::Delta => {
            return Err(Error::UnsupportedEncoding {
                encoding,
                element_type: identity.element_type(),
            })
        }
        Encoding::Dictionary => Box::new(DictionaryColumn::<T>::with_config(identity, config)?),
        Encoding::RunLength => Box::new(RleColumn::<T>::with_config(identity, config)?),
    };
    Ok(column)
}

impl ColumnHandle {
    /// Creates an empty column of `identity`'s element type using `encoding`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEncoding`] for delta encoding over
    /// booleans or strings and [`Error::Config`] for persistence suffixes
    /// that collide.
    pub fn create(
        identity: ColumnIdentity,
        encoding: Encoding,
        config: &CodecConfig,
    ) -> Result<Self> {
        let element_type = identity.element_type();
        debug!(column = identity.name(), %element_type, %encoding, "Creating column");
        Ok(match element_type {
            ElementType::Int32 => Self::Int32(numeric(identity, encoding, config)?),
            ElementType::Int64 => Self::Int64(numeric(identity, encoding, config)?),
            ElementType::UInt32 => Self::UInt32(numeric(identity, encoding, config)?),
            ElementType::UInt64 => Self::UInt64(numeric(identity, encoding, config)?),
            ElementType::Float32 => Self::Float32(numeric(identity, encoding, config)?),
            ElementType::Float64 => Self::Float64(numeric(identity, encoding, config)?),
            ElementType::Bool => Self::Bool(non_numeric(identity, encoding, config)?),
            ElementType::Varchar => Self::Varchar(non_numeric(identity, encoding, config)?),
        })
    }

    /// Name and element type of the column.
    #[must_use]
    pub fn identity(&self) -> &ColumnIdentity {
        dispatch!(self, col => col.identity())
    }

    /// Encoding of the column.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        dispatch!(self, col => col.encoding())
    }

    /// Appends a boxed value.
    pub fn insert(&mut self, value: &Value) -> Result<()> {
        dispatch!(self, col => col.insert_value(value))
    }

    /// Returns the boxed logical value at `tid`.
    pub fn get(&self, tid: Tid) -> Result<Value> {
        dispatch!(self, col => col.get(tid))
    }

    /// Replaces the value at `tid`.
    pub fn update(&mut self, tid: Tid, value: &Value) -> Result<()> {
        dispatch!(self, col => col.update(tid, value))
    }

    /// Replaces the value at every listed TID.
    pub fn update_many(&mut self, tids: &[Tid], value: &Value) -> Result<()> {
        dispatch!(self, col => col.update_many(tids, value))
    }

    /// Deletes the row at `tid`.
    pub fn remove(&mut self, tid: Tid) -> Result<()> {
        dispatch!(self, col => col.remove(tid))
    }

    /// Deletes every listed row.
    pub fn remove_many(&mut self, tids: &[Tid]) -> Result<()> {
        dispatch!(self, col => col.remove_many(tids))
    }

    /// Removes every row.
    pub fn clear_content(&mut self) {
        dispatch!(self, col => col.clear_content());
    }

    /// Number of logical rows.
    #[must_use]
    pub fn size(&self) -> usize {
        dispatch!(self, col => col.size())
    }

    /// Returns true if the column holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Estimated physical footprint in bytes.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        dispatch!(self, col => col.size_in_bytes())
    }

    /// Compression statistics.
    #[must_use]
    pub fn stats(&self) -> CompressionStats {
        dispatch!(self, col => col.stats())
    }

    /// Every logical value, boxed, in TID order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        dispatch!(self, col => col
            .decode_all()
            .into_iter()
            .map(ColumnElement::into_value)
            .collect())
    }

    /// Independent deep copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        map_variant!(self, col => col.copy())
    }

    /// Writes the column under `dir`.
    pub fn store(&self, dir: &Path) -> Result<()> {
        dispatch!(self, col => col.store(dir))
    }

    /// Replaces the column content with the streams under `dir`.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        dispatch!(self, col => col.load(dir))
    }
}

impl fmt::Display for ColumnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::column::render(f, self.identity().name(), self.values())
    }
}
