//! # `colpack` Core
//!
//! Compressed in-memory columns for a column-oriented storage engine.
//!
//! A column is a mutable sequence of values of one element type, addressed
//! by a zero-based row id ([`Tid`]). Three codecs implement the same
//! [`CompressedColumn`] contract and are interchangeable from the outside:
//!
//! - **Delta**: successive differences, for sequential numbers
//! - **Dictionary**: integer codes plus a value table, for low cardinality
//! - **Run-length**: `(value, length)` runs, for consecutive duplicates
//!
//! Each codec can store its physical state as binary streams under a
//! directory and load it back.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use colpack_core::{CodecConfig, ColumnHandle, ColumnIdentity, ElementType, Encoding, Value};
//!
//! let identity = ColumnIdentity::new("price", ElementType::Int32)?;
//! let mut column = ColumnHandle::create(identity, Encoding::RunLength, &CodecConfig::default())?;
//!
//! for v in [5, 5, 5, 7, 7] {
//!     column.insert(&Value::Int32(v))?;
//! }
//! column.update(1, &Value::Int32(9))?;
//! assert_eq!(column.get(1)?, Value::Int32(9));
//!
//! column.store(std::path::Path::new("./data"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Run lengths are u32 and codes are u32; both are indexed as usize.
// For new code: Use try_from() or explicit bounds checks instead of `as`.
// =============================================================================
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)] // Compression ratio is reported as f64
// =============================================================================
// STYLISTIC LINTS - Safe to allow globally (no bug risk)
// =============================================================================
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod column;
pub mod compression;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod handle;
pub mod persistence;
pub mod types;
pub mod value;

pub use column::{CompressedColumn, CompressionStats};
pub use compression::{DeltaColumn, DictCodebook, DictionaryColumn, RleColumn, Run};
pub use config::{CodecConfig, ConfigError, PersistenceConfig, RleConfig, RunMerge};
pub use error::{Error, Result};
pub use handle::ColumnHandle;
pub use types::{ColumnIdentity, ElementType, Encoding, PositionList, Tid};
pub use value::{ColumnElement, DeltaElement, Value};
