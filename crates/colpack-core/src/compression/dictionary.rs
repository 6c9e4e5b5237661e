//! Dictionary Encoding for column compression.
//!
//! Replaces repeated values with compact integer codes.
//! Ideal for columns with low cardinality (e.g., country, category).
//!
//! Codes are `u32` regardless of the element type and are handed out by a
//! monotonic counter: a code is never reused, even after every row holding
//! it has been removed. The dictionary therefore only grows.

use crate::column::{
    check_positions, check_removal_positions, check_tid, render, vec_footprint, CompressedColumn,
};
use crate::config::{CodecConfig, PersistenceConfig};
use crate::error::{Error, Result};
use crate::persistence::{encode_stream, read_stream, stream_path, write_streams, StreamKind};
use crate::types::{ColumnIdentity, Encoding, Tid};
use crate::value::ColumnElement;
use rustc_hash::FxHashMap;
use std::fmt;
use std::mem::size_of;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Dictionary codebook mapping values to codes and back.
#[derive(Debug, Clone)]
pub struct DictCodebook<T: ColumnElement> {
    /// Value to code mapping.
    value_to_code: FxHashMap<T::Key, u32>,
    /// Code to value mapping; the code is the index.
    code_to_value: Vec<T>,
}

impl<T: ColumnElement> Default for DictCodebook<T> {
    fn default() -> Self {
        Self {
            value_to_code: FxHashMap::default(),
            code_to_value: Vec::new(),
        }
    }
}

impl<T: ColumnElement> DictCodebook<T> {
    /// Creates an empty codebook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the codebook is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code_to_value.is_empty()
    }

    /// Number of distinct values (and of allocated codes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.code_to_value.len()
    }

    /// Code of `value`, if it has one.
    #[must_use]
    pub fn code_of(&self, value: &T) -> Option<u32> {
        self.value_to_code.get(&value.key()).copied()
    }

    /// Decode a code back to its value.
    #[must_use]
    pub fn decode(&self, code: u32) -> Option<&T> {
        self.code_to_value.get(code as usize)
    }

    /// Encode a single value, returning its code.
    ///
    /// If the value is new, the next unused code is allocated for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DictionaryFull`] once every `u32` code is taken.
    pub fn encode(&mut self, value: T) -> Result<u32> {
        let key = value.key();
        if let Some(&code) = self.value_to_code.get(&key) {
            return Ok(code);
        }

        let code = u32::try_from(self.code_to_value.len()).map_err(|_| Error::DictionaryFull)?;
        trace!(code, "Allocated dictionary code");
        self.value_to_code.insert(key, code);
        self.code_to_value.push(value);
        Ok(code)
    }

    /// (value, code) pairs in code order, as persisted.
    #[must_use]
    pub fn pairs(&self) -> Vec<(T, u32)> {
        self.code_to_value
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code as u32))
            .collect()
    }

    /// Rebuilds both lookup directions from persisted pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] unless the pairs form a bijection
    /// between distinct values and the dense code range `0..n`.
    pub fn from_pairs(mut pairs: Vec<(T, u32)>) -> Result<Self> {
        pairs.sort_by_key(|&(_, code)| code);
        let mut codebook = Self {
            value_to_code: FxHashMap::default(),
            code_to_value: Vec::with_capacity(pairs.len()),
        };
        for (expected, (value, code)) in pairs.into_iter().enumerate() {
            if code as usize != expected {
                return Err(Error::CorruptData(format!(
                    "dictionary codes are not dense: expected code {expected}, found {code}"
                )));
            }
            if codebook.value_to_code.insert(value.key(), code).is_some() {
                return Err(Error::CorruptData(format!(
                    "dictionary maps value {value} to more than one code"
                )));
            }
            codebook.code_to_value.push(value);
        }
        Ok(codebook)
    }

    /// Estimated footprint of both lookup directions.
    fn size_in_bytes(&self) -> usize {
        vec_footprint(&self.code_to_value, self.code_to_value.capacity())
            + self.value_to_code.len() * size_of::<u32>()
    }
}

/// Dictionary-compressed column.
#[derive(Debug, Clone)]
pub struct DictionaryColumn<T: ColumnElement> {
    identity: ColumnIdentity,
    /// One code per logical row.
    codes: Vec<u32>,
    /// The codebook.
    codebook: DictCodebook<T>,
    persistence: PersistenceConfig,
}

impl<T: ColumnElement> DictionaryColumn<T> {
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
            codes: Vec::new(),
            codebook: DictCodebook::new(),
            persistence: config.persistence.clone(),
        })
    }

    /// Physical code sequence.
    #[must_use]
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Get the codebook.
    #[must_use]
    pub fn codebook(&self) -> &DictCodebook<T> {
        &self.codebook
    }

    /// Number of distinct values ever inserted.
    #[must_use]
    pub fn dictionary_len(&self) -> usize {
        self.codebook.len()
    }

    /// Code assigned to `value`, if any.
    #[must_use]
    pub fn code_of(&self, value: &T) -> Option<u32> {
        self.codebook.code_of(value)
    }

    fn lookup(&self, code: u32) -> &T {
        // Every stored code has a table entry.
        &self.codebook.code_to_value[code as usize]
    }

    /// Reads and cross-checks both streams without touching `self`.
    fn read_streams(&self, dir: &Path) -> Result<(Vec<u32>, DictCodebook<T>)> {
        let name = self.identity.name();
        let verify = self.persistence.verify_checksums;
        let codes: Vec<u32> = read_stream(
            &stream_path(dir, name, ""),
            StreamKind::Codes,
            T::ELEMENT_TYPE,
            verify,
        )?;
        let pairs: Vec<(T, u32)> = read_stream(
            &stream_path(dir, name, &self.persistence.dictionary_suffix),
            StreamKind::Dictionary,
            T::ELEMENT_TYPE,
            verify,
        )?;
        let codebook = DictCodebook::from_pairs(pairs)?;
        if let Some(&code) = codes.iter().find(|&&c| c as usize >= codebook.len()) {
            return Err(Error::CorruptData(format!(
                "code {code} has no dictionary entry ({} entries)",
                codebook.len()
            )));
        }
        Ok((codes, codebook))
    }
}

impl<T: ColumnElement> CompressedColumn for DictionaryColumn<T> {
    type Element = T;

    fn identity(&self) -> &ColumnIdentity {
        &self.identity
    }

    fn encoding(&self) -> Encoding {
        Encoding::Dictionary
    }

    fn insert(&mut self, value: T) -> Result<()> {
        let code = self.codebook.encode(value)?;
        self.codes.push(code);
        Ok(())
    }

    fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.codes.reserve(values.len());
        for value in values {
            let code = self.codebook.encode(value.clone())?;
            self.codes.push(code);
        }
        Ok(())
    }

    fn value_at(&self, tid: Tid) -> Result<T> {
        check_tid(tid, self.codes.len())?;
        Ok(self.lookup(self.codes[tid]).clone())
    }

    fn set(&mut self, tid: Tid, value: T) -> Result<()> {
        check_tid(tid, self.codes.len())?;
        let code = self.codebook.encode(value)?;
        self.codes[tid] = code;
        Ok(())
    }

    fn set_many(&mut self, tids: &[Tid], value: T) -> Result<()> {
        check_positions(tids, self.codes.len())?;
        if tids.is_empty() {
            return Ok(());
        }
        let code = self.codebook.encode(value)?;
        for &tid in tids {
            self.codes[tid] = code;
        }
        Ok(())
    }

    fn remove(&mut self, tid: Tid) -> Result<()> {
        check_tid(tid, self.codes.len())?;
        self.codes.remove(tid);
        Ok(())
    }

    fn remove_many(&mut self, tids: &[Tid]) -> Result<()> {
        check_removal_positions(tids, self.codes.len())?;
        let mut doomed = tids.iter().peekable();
        let mut tid = 0;
        self.codes.retain(|_| {
            let keep = doomed.peek() != Some(&&tid);
            if !keep {
                doomed.next();
            }
            tid += 1;
            keep
        });
        Ok(())
    }

    fn clear_content(&mut self) {
        self.codes.clear();
    }

    fn size(&self) -> usize {
        self.codes.len()
    }

    fn size_in_bytes(&self) -> usize {
        self.codes.capacity() * size_of::<u32>() + self.codebook.size_in_bytes()
    }

    fn decode_all(&self) -> Vec<T> {
        self.codes
            .iter()
            .map(|&code| self.lookup(code).clone())
            .collect()
    }

    fn copy(&self) -> Box<dyn CompressedColumn<Element = T>> {
        Box::new(self.clone())
    }

    fn store(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let name = self.identity.name();
        let codes_path = stream_path(dir, name, "");
        let dict_path = stream_path(dir, name, &self.persistence.dictionary_suffix);

        write_streams(&[
            (
                codes_path,
                encode_stream(StreamKind::Codes, T::ELEMENT_TYPE, &self.codes)?,
            ),
            (
                dict_path,
                encode_stream(
                    StreamKind::Dictionary,
                    T::ELEMENT_TYPE,
                    &self.codebook.pairs(),
                )?,
            ),
        ])?;
        debug!(
            column = name,
            rows = self.codes.len(),
            distinct = self.codebook.len(),
            "Stored dictionary column"
        );
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        let (codes, codebook) = self.read_streams(dir).inspect_err(|e| {
            warn!(column = self.identity.name(), error = %e, "Rejected dictionary column streams");
        })?;

        self.codes = codes;
        self.codebook = codebook;
        debug!(
            column = self.identity.name(),
            rows = self.codes.len(),
            distinct = self.codebook.len(),
            "Loaded dictionary column"
        );
        Ok(())
    }
}

impl<T: ColumnElement> fmt::Display for DictionaryColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            f,
            self.identity.name(),
            self.codes.iter().map(|&code| self.lookup(code)),
        )
    }
}
