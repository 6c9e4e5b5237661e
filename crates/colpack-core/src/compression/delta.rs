//! Delta encoding for column compression.
//!
//! Stores successive differences: `delta[0] = v[0]` and
//! `delta[i] = v[i] - v[i-1]`, so `v[i]` is the prefix sum of
//! `delta[0..=i]`. Appends are O(1) thanks to the cached last logical value;
//! random access is O(tid). Ideal for scan/append-heavy columns whose
//! successive values are close (timestamps, sequence numbers).

use crate::column::{
    check_positions, check_removal_positions, check_tid, render, vec_footprint, CompressedColumn,
};
use crate::config::{CodecConfig, PersistenceConfig};
use crate::error::{Error, Result};
use crate::persistence::{read_stream, stream_path, write_stream, StreamKind};
use crate::types::{ColumnIdentity, Encoding, Tid};
use crate::value::DeltaElement;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Encodes logical values into deltas, returning the deltas and the last value.
#[must_use]
pub fn encode_deltas<T: DeltaElement>(values: &[T]) -> (Vec<T>, T) {
    let mut last = T::default();
    let deltas = values
        .iter()
        .map(|&value| {
            let delta = value.delta_from(last);
            last = value;
            delta
        })
        .collect();
    (deltas, last)
}

/// Decodes deltas back into logical values (prefix sum).
#[must_use]
pub fn decode_deltas<T: DeltaElement>(deltas: &[T]) -> Vec<T> {
    let mut acc = T::default();
    deltas
        .iter()
        .map(|&delta| {
            acc = acc.apply_delta(delta);
            acc
        })
        .collect()
}

/// Delta-compressed column.
#[derive(Debug, Clone)]
pub struct DeltaColumn<T: DeltaElement> {
    identity: ColumnIdentity,
    /// Physical sequence, same length as the logical column.
    deltas: Vec<T>,
    /// Logical value of the last row (zero when empty).
    last: T,
    persistence: PersistenceConfig,
}

impl<T: DeltaElement> DeltaColumn<T> {
    /// Creates an empty column with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the identity's element type is not `T`.
    pub fn new(identity: ColumnIdentity) -> Result<Self> {
        Self::with_config(identity, &CodecConfig::default())
    }

    /// Creates an empty column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the identity's element type is not `T`
    /// and [`Error::Config`] if the persistence section would make two streams
    /// share a file.
    pub fn with_config(identity: ColumnIdentity, config: &CodecConfig) -> Result<Self> {
        if identity.element_type() != T::ELEMENT_TYPE {
            return Err(Error::TypeMismatch {
                expected: identity.element_type(),
                actual: T::ELEMENT_TYPE,
            });
        }
        config.persistence.validate()?;
        Ok(Self {
            identity,
            deltas: Vec::new(),
            last: T::default(),
            persistence: config.persistence.clone(),
        })
    }

    /// Physical delta sequence.
    #[must_use]
    pub fn deltas(&self) -> &[T] {
        &self.deltas
    }

    /// Logical value at `tid`, assuming it is in range.
    fn prefix_sum(&self, tid: Tid) -> T {
        self.deltas[..=tid]
            .iter()
            .fold(T::default(), |acc, &delta| acc.apply_delta(delta))
    }

    fn reencode(&mut self, values: &[T]) {
        let (deltas, last) = encode_deltas(values);
        self.deltas = deltas;
        self.last = last;
    }
}

impl<T: DeltaElement> CompressedColumn for DeltaColumn<T> {
    type Element = T;

    fn identity(&self) -> &ColumnIdentity {
        &self.identity
    }

    fn encoding(&self) -> Encoding {
        Encoding::Delta
    }

    fn insert(&mut self, value: T) -> Result<()> {
        self.deltas.push(value.delta_from(self.last));
        self.last = value;
        Ok(())
    }

    fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.deltas.reserve(values.len());
        for &value in values {
            self.deltas.push(value.delta_from(self.last));
            self.last = value;
        }
        Ok(())
    }

    fn value_at(&self, tid: Tid) -> Result<T> {
        check_tid(tid, self.deltas.len())?;
        Ok(self.prefix_sum(tid))
    }

    fn set(&mut self, tid: Tid, value: T) -> Result<()> {
        check_tid(tid, self.deltas.len())?;
        // Only the deltas of `tid` and its successor change.
        let previous = if tid == 0 {
            T::default()
        } else {
            self.prefix_sum(tid - 1)
        };
        let old = previous.apply_delta(self.deltas[tid]);
        self.deltas[tid] = value.delta_from(previous);
        if let Some(next) = self.deltas.get_mut(tid + 1) {
            let successor = old.apply_delta(*next);
            *next = successor.delta_from(value);
        } else {
            self.last = value;
        }
        Ok(())
    }

    fn set_many(&mut self, tids: &[Tid], value: T) -> Result<()> {
        check_positions(tids, self.deltas.len())?;
        if tids.is_empty() {
            return Ok(());
        }
        let mut values = decode_deltas(&self.deltas);
        for &tid in tids {
            values[tid] = value;
        }
        self.reencode(&values);
        Ok(())
    }

    fn remove(&mut self, tid: Tid) -> Result<()> {
        check_tid(tid, self.deltas.len())?;
        let removed = self.deltas.remove(tid);
        if let Some(next) = self.deltas.get_mut(tid) {
            // v[tid+1] - v[tid-1] == delta[tid+1] + delta[tid]
            *next = next.apply_delta(removed);
        } else {
            self.last = self.last.delta_from(removed);
        }
        Ok(())
    }

    fn remove_many(&mut self, tids: &[Tid]) -> Result<()> {
        check_removal_positions(tids, self.deltas.len())?;
        let values = decode_deltas(&self.deltas);
        let mut doomed = tids.iter().peekable();
        let kept: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(tid, value)| {
                if doomed.peek() == Some(&&tid) {
                    doomed.next();
                    None
                } else {
                    Some(value)
                }
            })
            .collect();
        self.reencode(&kept);
        Ok(())
    }

    fn clear_content(&mut self) {
        self.deltas.clear();
        self.last = T::default();
    }

    fn size(&self) -> usize {
        self.deltas.len()
    }

    fn size_in_bytes(&self) -> usize {
        vec_footprint(&self.deltas, self.deltas.capacity())
    }

    fn decode_all(&self) -> Vec<T> {
        decode_deltas(&self.deltas)
    }

    fn copy(&self) -> Box<dyn CompressedColumn<Element = T>> {
        Box::new(self.clone())
    }

    fn store(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let path = stream_path(dir, self.identity.name(), "");
        write_stream(&path, StreamKind::Deltas, T::ELEMENT_TYPE, &self.deltas)?;
        debug!(
            column = self.identity.name(),
            rows = self.deltas.len(),
            "Stored delta column"
        );
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        let path = stream_path(dir, self.identity.name(), "");
        let deltas: Vec<T> = read_stream(
            &path,
            StreamKind::Deltas,
            T::ELEMENT_TYPE,
            self.persistence.verify_checksums,
        )
        .inspect_err(|e| {
            warn!(column = self.identity.name(), error = %e, "Rejected delta column stream");
        })?;
        let last = deltas
            .iter()
            .fold(T::default(), |acc, &delta| acc.apply_delta(delta));
        self.deltas = deltas;
        self.last = last;
        debug!(
            column = self.identity.name(),
            rows = self.deltas.len(),
            "Loaded delta column"
        );
        Ok(())
    }
}

impl<T: DeltaElement> fmt::Display for DeltaColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, self.identity.name(), self.decode_all())
    }
}
