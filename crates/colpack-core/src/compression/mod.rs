//! Column codecs for `colpack`.
//!
//! - Delta encoding for sequential numbers
//! - Dictionary encoding for repeated values
//! - Run-length encoding for consecutive duplicates
//!
//! All three implement [`CompressedColumn`](crate::column::CompressedColumn).

mod delta;
mod dictionary;
mod rle;

pub use delta::{decode_deltas, encode_deltas, DeltaColumn};
pub use dictionary::{DictCodebook, DictionaryColumn};
pub use rle::{locate, merge_around, push_value, remove_at, split_update, Run, RleColumn};

#[cfg(test)]
mod rle_tests;
