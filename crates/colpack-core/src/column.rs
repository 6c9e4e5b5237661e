//! The compressed column contract.
//!
//! Every codec implements [`CompressedColumn`] and, seen from outside, behaves
//! like an ordinary mutable sequence of its element type. The trait splits in
//! two halves:
//!
//! - a typed half (`insert`, `value_at`, `set`, `set_many`) used when the
//!   element type is known statically, and
//! - a boxed half (`insert_value`, `get`, `update`, `update_many`) that
//!   unpacks a [`Value`] first and then delegates to the typed half.
//!
//! Mutations validate every precondition before touching physical state, so
//! a failed call leaves the column exactly as it was.

use crate::error::{Error, Result};
use crate::types::{ColumnIdentity, Encoding, Tid};
use crate::value::{ColumnElement, Value};
use std::fmt;
use std::mem::size_of;
use std::path::Path;

/// Compression statistics of a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressionStats {
    /// Number of logical values.
    pub total_values: usize,
    /// Size of the values as a plain uncompressed column.
    pub uncompressed_size_bytes: usize,
    /// Physical footprint reported by the codec.
    pub compressed_size_bytes: usize,
    /// Compression ratio (uncompressed / compressed), 0 for an empty column.
    pub compression_ratio: f64,
}

/// Shared contract of the delta, dictionary and run-length codecs.
pub trait CompressedColumn: fmt::Debug + Send {
    /// Element type stored by the column.
    type Element: ColumnElement;

    /// Name and element type of the column.
    fn identity(&self) -> &ColumnIdentity;

    /// Encoding implemented by this codec.
    fn encoding(&self) -> Encoding;

    /// Appends `value` as the new last logical element.
    fn insert(&mut self, value: Self::Element) -> Result<()>;

    /// Appends a boxed value.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyValue`] or [`Error::TypeMismatch`] if the box does not
    /// hold a value of the column's element type.
    fn insert_value(&mut self, value: &Value) -> Result<()> {
        let value = Self::Element::from_value(value)?;
        self.insert(value)
    }

    /// Appends already-typed values in order.
    fn extend_from_slice(&mut self, values: &[Self::Element]) -> Result<()> {
        for value in values {
            self.insert(value.clone())?;
        }
        Ok(())
    }

    /// Decodes the logical value at `tid`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `tid >= size()`.
    fn value_at(&self, tid: Tid) -> Result<Self::Element>;

    /// Decodes the logical value at `tid` and boxes it.
    fn get(&self, tid: Tid) -> Result<Value> {
        self.value_at(tid).map(ColumnElement::into_value)
    }

    /// Replaces the logical value at `tid`.
    fn set(&mut self, tid: Tid, value: Self::Element) -> Result<()>;

    /// Replaces the logical value at `tid` with a boxed value.
    fn update(&mut self, tid: Tid, value: &Value) -> Result<()> {
        let value = Self::Element::from_value(value)?;
        self.set(tid, value)
    }

    /// Replaces the logical value at every listed TID.
    ///
    /// All TIDs are validated first; the list order is irrelevant.
    fn set_many(&mut self, tids: &[Tid], value: Self::Element) -> Result<()>;

    /// Replaces the logical value at every listed TID with a boxed value.
    fn update_many(&mut self, tids: &[Tid], value: &Value) -> Result<()> {
        let value = Self::Element::from_value(value)?;
        self.set_many(tids, value)
    }

    /// Deletes the logical element at `tid`, shifting later TIDs down.
    fn remove(&mut self, tid: Tid) -> Result<()>;

    /// Deletes every listed logical element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyList`] for an empty list, [`Error::UnsortedPositionList`]
    /// unless the list is strictly ascending, [`Error::OutOfRange`] for any
    /// invalid TID. Nothing is removed on error.
    fn remove_many(&mut self, tids: &[Tid]) -> Result<()>;

    /// Resets the column to zero logical elements.
    fn clear_content(&mut self);

    /// Number of logical elements.
    fn size(&self) -> usize;

    /// Returns true if the column holds no elements.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Estimated physical footprint in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Decodes the whole column into a plain vector.
    fn decode_all(&self) -> Vec<Self::Element>;

    /// Compression statistics relative to a plain column.
    fn stats(&self) -> CompressionStats {
        let values = self.decode_all();
        let uncompressed = plain_footprint(&values);
        let compressed = self.size_in_bytes();
        let ratio = if compressed > 0 && !values.is_empty() {
            uncompressed as f64 / compressed as f64
        } else {
            0.0
        };
        CompressionStats {
            total_values: values.len(),
            uncompressed_size_bytes: uncompressed,
            compressed_size_bytes: compressed,
            compression_ratio: ratio,
        }
    }

    /// Deep copy sharing no physical state with `self`.
    fn copy(&self) -> Box<dyn CompressedColumn<Element = Self::Element>>;

    /// Writes the physical state under `dir`.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if a stream cannot be written.
    fn store(&self, dir: &Path) -> Result<()>;

    /// Replaces the physical state with the streams found under `dir`.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if a stream cannot be read, [`Error::CorruptData`] if it
    /// cannot be decoded. The column is unchanged on error.
    fn load(&mut self, dir: &Path) -> Result<()>;
}

/// Checks that `tid` addresses a row of a column of `size` rows.
pub fn check_tid(tid: Tid, size: usize) -> Result<()> {
    if tid < size {
        Ok(())
    } else {
        Err(Error::OutOfRange { tid, size })
    }
}

/// Checks every TID of an update list.
pub fn check_positions(tids: &[Tid], size: usize) -> Result<()> {
    tids.iter().try_for_each(|&tid| check_tid(tid, size))
}

/// Checks a removal list: non-empty, strictly ascending, in range.
pub fn check_removal_positions(tids: &[Tid], size: usize) -> Result<()> {
    let Some(&last) = tids.last() else {
        return Err(Error::EmptyList);
    };
    if tids.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(Error::UnsortedPositionList);
    }
    // Ascending, so the last TID is the largest.
    check_tid(last, size)
}

/// Footprint of `values` stored in a vector of the given capacity.
///
/// Fixed-width types count the whole capacity; variable-width types count
/// the heap bytes of each element.
pub(crate) fn vec_footprint<T: ColumnElement>(values: &[T], capacity: usize) -> usize {
    if T::ELEMENT_TYPE.is_fixed_width() {
        capacity * size_of::<T>()
    } else {
        values
            .iter()
            .map(|v| v.heap_footprint().unwrap_or(size_of::<T>()))
            .sum()
    }
}

fn plain_footprint<T: ColumnElement>(values: &[T]) -> usize {
    vec_footprint(values, values.len())
}

/// Renders a column the way the storage engine's debug dump does.
pub(crate) fn render<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    values: impl IntoIterator<Item = T>,
) -> fmt::Result {
    writeln!(f, "| {name} |")?;
    writeln!(f, "________________________")?;
    for value in values {
        writeln!(f, "| {value} |")?;
    }
    Ok(())
}
