//! Codec
//!
//! Encoding used on the storage paths.
//!
//! - Log entries: the whole `Log` is serialized with bincode into the
//!   `value` column.
//! - u64 values: exactly 8 bytes, big-endian, no type tag.
//!
//! ## u64 decode policy
//! ```text
//! value bytes          decoded
//! ─────────────────    ─────────────────────
//! 8 bytes              big-endian u64
//! < 8 bytes            zero-filled on the right, then big-endian
//! > 8 bytes            first 8 bytes only
//! ```

use crate::entry::Log;
use crate::error::Result;

/// Width of an encoded u64
pub const U64_SIZE: usize = 8;

/// Encode a log entry for storage
pub fn encode_log(log: &Log) -> Result<Vec<u8>> {
    Ok(bincode::serialize(log)?)
}

/// Decode a stored log entry
pub fn decode_log(bytes: &[u8]) -> Result<Log> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode a u64 as 8 big-endian bytes
pub fn u64_to_bytes(value: u64) -> [u8; U64_SIZE] {
    value.to_be_bytes()
}

/// Decode a u64 from stored bytes (see module docs for non-8-byte input)
pub fn bytes_to_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; U64_SIZE];
    let n = bytes.len().min(U64_SIZE);
    buf[..n].copy_from_slice(&bytes[..n]);
    u64::from_be_bytes(buf)
}
