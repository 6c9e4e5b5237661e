//! Fuzz target for the column stream decoder.
//!
//! Stream headers and bincode payloads come straight from disk. A malformed
//! or hostile file must produce `CorruptData`, never a panic or an
//! allocation driven by a forged sequence length.

#![no_main]

use colpack_core::persistence::{decode_stream, StreamKind};
use colpack_core::{DictCodebook, ElementType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Checksums off so the fuzzer reaches the payload decoder.
    let _ = decode_stream::<Vec<i64>>(data, StreamKind::Deltas, ElementType::Int64, false);
    let _ = decode_stream::<Vec<u32>>(data, StreamKind::Codes, ElementType::UInt32, false);
    let _ = decode_stream::<Vec<u32>>(data, StreamKind::RunLengths, ElementType::Float64, false);
    let _ = decode_stream::<Vec<String>>(data, StreamKind::RunValues, ElementType::Varchar, false);

    if let Ok(pairs) =
        decode_stream::<Vec<(String, u32)>>(data, StreamKind::Dictionary, ElementType::Varchar, false)
    {
        let _ = DictCodebook::from_pairs(pairs);
    }
});
