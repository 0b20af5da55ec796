//! Network frame: checksummed LZ4 transform over envelope text.
//!
//! Layout: `crc32(text)` (u32 LE), uncompressed length (u32 LE), LZ4 block.
//! The length prefix and block are exactly what
//! `lz4_flex::compress_prepend_size` emits.
//!
//! The checksum prefix makes these frames incompatible with peers that send a
//! bare size-prefixed LZ4 block. Strip or add the first four bytes to bridge
//! the two.

use tracing::trace;

use crate::config::CodecLimits;
use crate::error::{SerialError, SerialResult};
use crate::version::{NETWORK_CHECKSUM_LEN, NETWORK_SIZE_PREFIX_LEN};

/// Compresses envelope text into a network frame.
pub fn compress(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let checksum = crc32fast::hash(bytes);
    let block = lz4_flex::compress_prepend_size(bytes);

    let mut output = Vec::with_capacity(NETWORK_CHECKSUM_LEN + block.len());
    output.extend_from_slice(&checksum.to_le_bytes());
    output.extend_from_slice(&block);
    trace!(text_len = bytes.len(), frame_len = output.len(), "compressed frame");
    output
}

/// Restores envelope text from a network frame, validating its checksum.
pub fn decompress(frame: &[u8], limits: &CodecLimits) -> SerialResult<String> {
    if frame.len() < NETWORK_CHECKSUM_LEN + NETWORK_SIZE_PREFIX_LEN {
        return Err(SerialError::CorruptPayload(format!(
            "frame of {} bytes is shorter than its header",
            frame.len()
        )));
    }
    let checksum = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let block = &frame[NETWORK_CHECKSUM_LEN..];
    let declared = u32::from_le_bytes([block[0], block[1], block[2], block[3]]) as usize;
    if declared > limits.max_decompressed_bytes {
        return Err(SerialError::LimitExceeded(format!(
            "frame declares {declared} bytes, limit is {}",
            limits.max_decompressed_bytes
        )));
    }

    let bytes = lz4_flex::decompress_size_prepended(block)
        .map_err(|err| SerialError::CorruptPayload(format!("lz4 block: {err}")))?;
    if bytes.len() != declared {
        return Err(SerialError::CorruptPayload(format!(
            "frame declared {declared} bytes but held {}",
            bytes.len()
        )));
    }
    if crc32fast::hash(&bytes) != checksum {
        return Err(SerialError::CorruptPayload("checksum mismatch".to_string()));
    }
    String::from_utf8(bytes)
        .map_err(|err| SerialError::CorruptPayload(format!("frame text is not utf-8: {err}")))
}

#[cfg(test)]
#[path = "tests/compress_tests.rs"]
mod tests;
