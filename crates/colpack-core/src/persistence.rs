//! Binary stream format for column persistence.
//!
//! Each physical stream of a column (deltas, codes, dictionary pairs, run
//! values, run lengths) is one file under the column directory.
//!
//! # Stream Format
//!
//! ```text
//! [Magic: "CPAK" 4 bytes]
//! [Version: 1 byte]
//! [Element type tag: 1 byte]
//! [Stream kind: 1 byte]
//! [Payload length: 8 bytes LE]
//! [CRC32 of payload: 4 bytes LE]
//! [Payload: bincode, fixed-width integers, length-prefixed sequences]
//! ```
//!
//! Decoding is done entirely in memory and never mutates a column; the
//! codecs swap in the decoded state only after every stream has been read.

use crate::error::{Error, Result};
use crate::types::ElementType;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stream file magic bytes.
pub const STREAM_MAGIC: &[u8; 4] = b"CPAK";

/// Current stream format version.
pub const STREAM_VERSION: u8 = 1;

/// Header size: magic(4) + version(1) + element(1) + kind(1) + len(8) + crc(4).
pub const HEADER_SIZE: usize = 19;

/// Which physical sequence a stream holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Delta codec physical sequence.
    Deltas,
    /// Dictionary codec code sequence.
    Codes,
    /// Dictionary codec (value, code) pairs.
    Dictionary,
    /// Run-length codec run values.
    RunValues,
    /// Run-length codec run lengths.
    RunLengths,
}

impl StreamKind {
    /// One-byte tag written into the stream header.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Deltas => 1,
            Self::Codes => 2,
            Self::Dictionary => 3,
            Self::RunValues => 4,
            Self::RunLengths => 5,
        }
    }
}

/// Simple CRC32 implementation (IEEE 802.3 polynomial).
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Table index always 0-255
pub fn crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[idx];
    }
    !crc
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Path of a column stream: `<dir>/<name><suffix>`.
#[must_use]
pub fn stream_path(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{name}{suffix}"))
}

/// Encodes `payload` as a complete stream (header + payload).
///
/// # Errors
///
/// Returns [`Error::CorruptData`] if the payload cannot be serialized.
pub fn encode_stream<P: Serialize + ?Sized>(
    kind: StreamKind,
    element_type: ElementType,
    payload: &P,
) -> Result<Vec<u8>> {
    let body = bincode_options()
        .serialize(payload)
        .map_err(|e| Error::CorruptData(format!("cannot serialize {kind:?} stream: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
    bytes.extend_from_slice(STREAM_MAGIC);
    bytes.push(STREAM_VERSION);
    bytes.push(element_type.tag());
    bytes.push(kind.tag());
    bytes.extend_from_slice(&(body.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&crc32(&body).to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decodes a complete stream produced by [`encode_stream`].
///
/// # Errors
///
/// Returns [`Error::CorruptData`] if the header does not match `kind` and
/// `element_type`, the lengths disagree, the checksum fails (when
/// `verify_checksum` is set), or the payload cannot be deserialized.
pub fn decode_stream<P: DeserializeOwned>(
    bytes: &[u8],
    kind: StreamKind,
    element_type: ElementType,
    verify_checksum: bool,
) -> Result<P> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::CorruptData(format!(
            "{kind:?} stream too small: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != STREAM_MAGIC {
        return Err(Error::CorruptData(format!("{kind:?} stream: invalid magic")));
    }
    if bytes[4] != STREAM_VERSION {
        return Err(Error::CorruptData(format!(
            "{kind:?} stream: unsupported version {}",
            bytes[4]
        )));
    }
    if bytes[5] != element_type.tag() {
        let found = ElementType::from_tag(bytes[5])
            .map_or_else(|| format!("unknown tag {}", bytes[5]), |t| t.to_string());
        return Err(Error::CorruptData(format!(
            "{kind:?} stream holds {found}, expected {element_type}"
        )));
    }
    if bytes[6] != kind.tag() {
        return Err(Error::CorruptData(format!(
            "expected {kind:?} stream, found stream kind {}",
            bytes[6]
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[7..15]);
    let declared_len = u64::from_le_bytes(len_bytes);
    let body = &bytes[HEADER_SIZE..];
    if declared_len != body.len() as u64 {
        return Err(Error::CorruptData(format!(
            "{kind:?} stream: declared {declared_len} payload bytes, found {}",
            body.len()
        )));
    }

    if verify_checksum {
        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&bytes[15..19]);
        let stored = u32::from_le_bytes(crc_bytes);
        let computed = crc32(body);
        if stored != computed {
            return Err(Error::CorruptData(format!(
                "{kind:?} stream: checksum mismatch (stored {stored:#010x}, computed {computed:#010x})"
            )));
        }
    }

    bincode_options()
        .with_limit(body.len() as u64)
        .deserialize(body)
        .map_err(|e| Error::CorruptData(format!("{kind:?} stream: {e}")))
}

/// Writes a stream file, replacing any previous content.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created, written, synced or
/// moved into place.
pub fn write_stream<P: Serialize + ?Sized>(
    path: &Path,
    kind: StreamKind,
    element_type: ElementType,
    payload: &P,
) -> Result<()> {
    let bytes = encode_stream(kind, element_type, payload)?;
    write_streams(&[(path.to_path_buf(), bytes)])
}

/// Writes several encoded streams as one unit.
///
/// Every stream goes to `<path>.tmp` first; the final paths are only
/// replaced once all temporary files are written and synced. If any write
/// fails, the temporary files are removed and the previous streams stay in
/// place.
///
/// # Errors
///
/// Returns [`Error::Io`] if a stream cannot be written or renamed.
pub fn write_streams(streams: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(streams.len());
    for (path, bytes) in streams {
        let temp = temp_path(path);
        if let Err(e) = write_synced(&temp, bytes) {
            let _ = std::fs::remove_file(&temp);
            for (written, _) in &staged {
                let _ = std::fs::remove_file(written);
            }
            return Err(e);
        }
        staged.push((temp, path.as_path()));
    }

    for (temp, path) in &staged {
        std::fs::rename(temp, path)?;
    }
    Ok(())
}

/// Temporary sibling of a stream file: `<path>.tmp`.
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Reads and decodes a stream file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::CorruptData`] if its content is malformed.
pub fn read_stream<P: DeserializeOwned>(
    path: &Path,
    kind: StreamKind,
    element_type: ElementType,
    verify_checksum: bool,
) -> Result<P> {
    let bytes = std::fs::read(path)?;
    decode_stream(&bytes, kind, element_type, verify_checksum)
}
