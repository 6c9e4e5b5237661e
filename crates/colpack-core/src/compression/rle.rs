//! Run-length encoding for column compression.
//!
//! Stores consecutive duplicates as `(value, length)` runs. Best for sorted
//! or low-cardinality columns with long runs. Updates are the expensive
//! operation: overwriting one row inside a run splits it into up to three.
//!
//! # Invariants
//!
//! - Every run has `length >= 1`.
//! - `Σ length == size()` after every operation.
//! - With [`RunMerge::Eager`], no two adjacent runs hold the same value
//!   unless merging them would overflow a `u32` length.
//!
//! The run-editing steps are free functions over `Vec<Run<T>>` so they can be
//! tested without boxing or I/O.

use crate::column::{
    check_positions, check_removal_positions, check_tid, render, CompressedColumn,
};
use crate::config::{CodecConfig, PersistenceConfig, RunMerge};
use crate::error::{Error, Result};
use crate::persistence::{encode_stream, read_stream, stream_path, write_streams, StreamKind};
use crate::types::{ColumnIdentity, Encoding, Tid};
use crate::value::ColumnElement;
use std::fmt;
use std::mem::size_of;
use std::path::Path;
use tracing::{debug, trace, warn};

/// A block of `length` consecutive rows holding `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<T> {
    /// Value of every row in the run.
    pub value: T,
    /// Number of rows, never zero.
    pub length: u32,
}

impl<T> Run<T> {
    /// Creates a run.
    #[must_use]
    pub fn new(value: T, length: u32) -> Self {
        Self { value, length }
    }
}

/// Finds the run covering `tid`.
///
/// Returns the run index and the offset of `tid` inside that run, or `None`
/// if `tid` is past the end.
#[must_use]
pub fn locate<T>(runs: &[Run<T>], tid: Tid) -> Option<(usize, usize)> {
    let mut start = 0usize;
    for (idx, run) in runs.iter().enumerate() {
        let end = start + run.length as usize;
        if tid < end {
            return Some((idx, tid - start));
        }
        start = end;
    }
    None
}

/// Appends one value, extending the last run when it holds the same value.
pub fn push_value<T: ColumnElement>(runs: &mut Vec<Run<T>>, value: T) {
    match runs.last_mut() {
        Some(last) if last.value.is_same(&value) && last.length < u32::MAX => last.length += 1,
        _ => runs.push(Run::new(value, 1)),
    }
}

/// Overwrites the row at `offset` inside run `idx` with `value`.
///
/// A run longer than one row is split into up to three runs, preserving the
/// total length: `(old, offset)`, `(value, 1)`, `(old, length - offset - 1)`,
/// each kept only if non-empty. Returns the index of the run now holding the
/// row.
pub fn split_update<T: ColumnElement>(
    runs: &mut Vec<Run<T>>,
    idx: usize,
    offset: usize,
    value: T,
) -> usize {
    let run = &mut runs[idx];
    if run.value.is_same(&value) {
        return idx;
    }
    if run.length == 1 {
        run.value = value;
        return idx;
    }

    // offset < length <= u32::MAX
    let prefix = offset as u32;
    let suffix = run.length - prefix - 1;
    let old = run.value.clone();
    trace!(idx, prefix, suffix, "Splitting run");

    let mut replacement = Vec::with_capacity(3);
    if prefix > 0 {
        replacement.push(Run::new(old.clone(), prefix));
    }
    let singleton = idx + replacement.len();
    replacement.push(Run::new(value, 1));
    if suffix > 0 {
        replacement.push(Run::new(old, suffix));
    }
    runs.splice(idx..=idx, replacement);
    singleton
}

/// Deletes the row at run `idx`.
///
/// Returns `Some(idx)` if the whole run disappeared, in which case the runs
/// at `idx - 1` and `idx` became neighbours.
pub fn remove_at<T>(runs: &mut Vec<Run<T>>, idx: usize) -> Option<usize> {
    if runs[idx].length > 1 {
        runs[idx].length -= 1;
        None
    } else {
        runs.remove(idx);
        Some(idx)
    }
}

/// Merges run `idx` with equal-valued neighbours on either side.
///
/// Returns the index of the run that now contains the rows of run `idx`.
pub fn merge_around<T: ColumnElement>(runs: &mut Vec<Run<T>>, idx: usize) -> usize {
    let mut idx = idx;
    if idx + 1 < runs.len() && mergeable(&runs[idx], &runs[idx + 1]) {
        let next = runs.remove(idx + 1);
        runs[idx].length += next.length;
    }
    if idx > 0 && mergeable(&runs[idx - 1], &runs[idx]) {
        let current = runs.remove(idx);
        idx -= 1;
        runs[idx].length += current.length;
    }
    idx
}

fn mergeable<T: ColumnElement>(left: &Run<T>, right: &Run<T>) -> bool {
    left.value.is_same(&right.value) && left.length.checked_add(right.length).is_some()
}

/// Run-length-compressed column.
#[derive(Debug, Clone)]
pub struct RleColumn<T: ColumnElement> {
    identity: ColumnIdentity,
    runs: Vec<Run<T>>,
    /// Σ run lengths.
    len: usize,
    merge: RunMerge,
    persistence: PersistenceConfig,
}

impl<T: ColumnElement> RleColumn<T> {
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
            runs: Vec::new(),
            len: 0,
            merge: config.rle.merge,
            persistence: config.persistence.clone(),
        })
    }

    /// Physical run sequence.
    #[must_use]
    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Number of runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Merge policy of this column.
    #[must_use]
    pub fn merge_policy(&self) -> RunMerge {
        self.merge
    }

    fn set_in_range(&mut self, tid: Tid, value: T) {
        if let Some((idx, offset)) = locate(&self.runs, tid) {
            let idx = split_update(&mut self.runs, idx, offset, value);
            if self.merge == RunMerge::Eager {
                merge_around(&mut self.runs, idx);
            }
        }
    }

    fn remove_in_range(&mut self, tid: Tid) {
        if let Some((idx, _)) = locate(&self.runs, tid) {
            if let Some(gap) = remove_at(&mut self.runs, idx) {
                if self.merge == RunMerge::Eager && gap > 0 && gap < self.runs.len() {
                    merge_around(&mut self.runs, gap);
                }
            }
            self.len -= 1;
        }
    }

    /// Reads and cross-checks both streams without touching `self`.
    fn read_streams(&self, dir: &Path) -> Result<(Vec<Run<T>>, usize)> {
        let name = self.identity.name();
        let verify = self.persistence.verify_checksums;
        let values: Vec<T> = read_stream(
            &stream_path(dir, name, ""),
            StreamKind::RunValues,
            T::ELEMENT_TYPE,
            verify,
        )?;
        let lengths: Vec<u32> = read_stream(
            &stream_path(dir, name, &self.persistence.run_length_suffix),
            StreamKind::RunLengths,
            T::ELEMENT_TYPE,
            verify,
        )?;
        if values.len() != lengths.len() {
            return Err(Error::CorruptData(format!(
                "{} run values but {} run lengths",
                values.len(),
                lengths.len()
            )));
        }
        if let Some(pos) = lengths.iter().position(|&l| l == 0) {
            return Err(Error::CorruptData(format!("run {pos} has zero length")));
        }
        let total = lengths
            .iter()
            .try_fold(0usize, |acc, &l| acc.checked_add(l as usize))
            .ok_or_else(|| Error::CorruptData("total run length overflows".to_string()))?;
        let runs = values
            .into_iter()
            .zip(lengths)
            .map(|(value, length)| Run::new(value, length))
            .collect();
        Ok((runs, total))
    }
}

impl<T: ColumnElement> CompressedColumn for RleColumn<T> {
    type Element = T;

    fn identity(&self) -> &ColumnIdentity {
        &self.identity
    }

    fn encoding(&self) -> Encoding {
        Encoding::RunLength
    }

    fn insert(&mut self, value: T) -> Result<()> {
        push_value(&mut self.runs, value);
        self.len += 1;
        Ok(())
    }

    fn value_at(&self, tid: Tid) -> Result<T> {
        check_tid(tid, self.len)?;
        locate(&self.runs, tid)
            .map(|(idx, _)| self.runs[idx].value.clone())
            .ok_or(Error::OutOfRange {
                tid,
                size: self.len,
            })
    }

    fn set(&mut self, tid: Tid, value: T) -> Result<()> {
        check_tid(tid, self.len)?;
        self.set_in_range(tid, value);
        Ok(())
    }

    fn set_many(&mut self, tids: &[Tid], value: T) -> Result<()> {
        check_positions(tids, self.len)?;
        for &tid in tids {
            self.set_in_range(tid, value.clone());
        }
        Ok(())
    }

    fn remove(&mut self, tid: Tid) -> Result<()> {
        check_tid(tid, self.len)?;
        self.remove_in_range(tid);
        Ok(())
    }

    fn remove_many(&mut self, tids: &[Tid]) -> Result<()> {
        check_removal_positions(tids, self.len)?;
        // Highest first: lower TIDs keep their positions.
        for &tid in tids.iter().rev() {
            self.remove_in_range(tid);
        }
        Ok(())
    }

    fn clear_content(&mut self) {
        self.runs.clear();
        self.len = 0;
    }

    fn size(&self) -> usize {
        self.len
    }

    fn size_in_bytes(&self) -> usize {
        if T::ELEMENT_TYPE.is_fixed_width() {
            self.runs.capacity() * size_of::<Run<T>>()
        } else {
            self.runs
                .iter()
                .map(|run| {
                    run.value.heap_footprint().unwrap_or(size_of::<T>()) + size_of::<u32>()
                })
                .sum()
        }
    }

    fn decode_all(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        for run in &self.runs {
            values.extend(std::iter::repeat(run.value.clone()).take(run.length as usize));
        }
        values
    }

    fn copy(&self) -> Box<dyn CompressedColumn<Element = T>> {
        Box::new(self.clone())
    }

    fn store(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let name = self.identity.name();
        let values: Vec<&T> = self.runs.iter().map(|run| &run.value).collect();
        let lengths: Vec<u32> = self.runs.iter().map(|run| run.length).collect();

        write_streams(&[
            (
                stream_path(dir, name, ""),
                encode_stream(StreamKind::RunValues, T::ELEMENT_TYPE, &values)?,
            ),
            (
                stream_path(dir, name, &self.persistence.run_length_suffix),
                encode_stream(StreamKind::RunLengths, T::ELEMENT_TYPE, &lengths)?,
            ),
        ])?;
        debug!(
            column = name,
            rows = self.len,
            runs = self.runs.len(),
            "Stored run-length column"
        );
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        let (runs, len) = self.read_streams(dir).inspect_err(|e| {
            warn!(column = self.identity.name(), error = %e, "Rejected run-length column streams");
        })?;
        self.runs = runs;
        self.len = len;
        debug!(
            column = self.identity.name(),
            rows = self.len,
            runs = self.runs.len(),
            "Loaded run-length column"
        );
        Ok(())
    }
}

impl<T: ColumnElement> fmt::Display for RleColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            f,
            self.identity.name(),
            self.runs
                .iter()
                .flat_map(|run| std::iter::repeat(&run.value).take(run.length as usize)),
        )
    }
}
