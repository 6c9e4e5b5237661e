//! Error types for `colpack`.
//!
//! Every column operation reports failures through this single error type.
//! Nothing is swallowed or turned into a default value: an invalid TID, a
//! mismatched boxed value or an unreadable stream always surfaces here.

use crate::types::{ElementType, Encoding, Tid};
use thiserror::Error;

/// Result type alias for `colpack` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in column operations.
///
/// Error codes follow the pattern `COLPACK-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Boxed value holds a different element type than the column (COLPACK-001).
    #[error("[COLPACK-001] Type mismatch: column stores {expected}, value is {actual}")]
    TypeMismatch {
        /// Element type of the column.
        expected: ElementType,
        /// Element type carried by the boxed value.
        actual: ElementType,
    },

    /// Boxed value carries no value (COLPACK-002).
    #[error("[COLPACK-002] Boxed value is empty")]
    EmptyValue,

    /// TID is not a valid row of the column (COLPACK-003).
    #[error("[COLPACK-003] TID {tid} out of range for column of size {size}")]
    OutOfRange {
        /// Offending TID.
        tid: Tid,
        /// Logical size of the column when the TID was checked.
        size: usize,
    },

    /// Position list must not be empty (COLPACK-004).
    #[error("[COLPACK-004] Position list is empty")]
    EmptyList,

    /// Position list for removal is not strictly ascending (COLPACK-005).
    #[error("[COLPACK-005] Position list must be strictly ascending")]
    UnsortedPositionList,

    /// IO error (COLPACK-006).
    #[error("[COLPACK-006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted stream could not be decoded (COLPACK-007).
    #[error("[COLPACK-007] Corrupt data: {0}")]
    CorruptData(String),

    /// Codec cannot encode this element type (COLPACK-008).
    #[error("[COLPACK-008] {encoding} encoding does not support {element_type} columns")]
    UnsupportedEncoding {
        /// Requested encoding.
        encoding: Encoding,
        /// Element type of the column.
        element_type: ElementType,
    },

    /// Dictionary ran out of codes (COLPACK-009).
    #[error("[COLPACK-009] Dictionary is full: no unused code left")]
    DictionaryFull,

    /// Column name cannot be used as a stream file name (COLPACK-010).
    #[error("[COLPACK-010] Invalid column name: '{0}'")]
    InvalidColumnName(String),

    /// Configuration error (COLPACK-011).
    #[error("[COLPACK-011] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "COLPACK-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "COLPACK-001",
            Self::EmptyValue => "COLPACK-002",
            Self::OutOfRange { .. } => "COLPACK-003",
            Self::EmptyList => "COLPACK-004",
            Self::UnsortedPositionList => "COLPACK-005",
            Self::Io(_) => "COLPACK-006",
            Self::CorruptData(_) => "COLPACK-007",
            Self::UnsupportedEncoding { .. } => "COLPACK-008",
            Self::DictionaryFull => "COLPACK-009",
            Self::InvalidColumnName(_) => "COLPACK-010",
            Self::Config(_) => "COLPACK-011",
        }
    }

    /// Returns true if the caller can retry or correct the input.
    ///
    /// Corrupt streams are not recoverable without rewriting them.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptData(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
