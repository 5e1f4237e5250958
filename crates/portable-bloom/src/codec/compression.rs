//! # Payload Compression
//!
//! zlib (deflate with zlib framing) for envelope payloads.
//!
//! Inflation is bounded by the size the envelope's declared parameters
//! allow, and the stream must end exactly at the end of the payload.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::FilterError;

/// Trait for envelope payload compression
pub trait PayloadCompressor: Send + Sync {
    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, FilterError>;
    /// Decompress data, producing at most `max_len` bytes
    fn decompress(&self, data: &[u8], max_len: usize) -> Result<Vec<u8>, FilterError>;
    /// Whether the payload is actually transformed
    fn is_enabled(&self) -> bool;
}

/// zlib compressor
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl PayloadCompressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, FilterError> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), self.level);
        encoder
            .write_all(data)
            .map_err(|e| FilterError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| FilterError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8], max_len: usize) -> Result<Vec<u8>, FilterError> {
        let mut decoder = ZlibDecoder::new(data);
        let mut output = Vec::new();
        (&mut decoder)
            .take(max_len as u64 + 1)
            .read_to_end(&mut output)
            .map_err(|e| FilterError::IntegrityViolation {
                reason: format!("payload does not inflate: {e}"),
            })?;

        if output.len() > max_len {
            return Err(FilterError::SizeMismatch {
                expected: max_len,
                actual: output.len(),
            });
        }
        if decoder.total_in() != data.len() as u64 {
            return Err(FilterError::IntegrityViolation {
                reason: format!(
                    "{} trailing bytes after zlib stream",
                    data.len() as u64 - decoder.total_in()
                ),
            });
        }
        Ok(output)
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Pass-through for uncompressed envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCompressor;

impl PayloadCompressor for NoOpCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, FilterError> {
        Ok(data.to_vec())
    }

    /// Raw payloads are already bounded by their input, so `max_len` is
    /// left to the bit-store length check.
    fn decompress(&self, data: &[u8], _max_len: usize) -> Result<Vec<u8>, FilterError> {
        Ok(data.to_vec())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Compressor matching an envelope's `zlib` flag
pub fn for_flag(compressed: bool) -> Box<dyn PayloadCompressor> {
    if compressed {
        Box::new(ZlibCompressor::default())
    } else {
        Box::new(NoOpCompressor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_roundtrip() {
        let compressor = ZlibCompressor::default();

        let original: Vec<u8> = (0..4096).map(|i| (i % 7) as u8).collect();
        let compressed = compressor.compress(&original).expect("compress");
        let decompressed = compressor
            .decompress(&compressed, original.len())
            .expect("decompress");

        assert_eq!(decompressed, original);
        assert!(compressed.len() < original.len());
    }

    #[test]
    fn test_zlib_output_has_zlib_header() {
        let compressed = ZlibCompressor::default().compress(&[0u8; 64]).unwrap();
        // CMF byte for deflate with a 32K window
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn test_corrupt_stream_is_integrity_violation() {
        let result = ZlibCompressor::default().decompress(b"definitely not zlib", 64);
        assert!(matches!(
            result,
            Err(FilterError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn test_noop_compressor_passthrough() {
        let compressor = NoOpCompressor;

        let original = b"Test data that should not change";
        let compressed = compressor.compress(original).expect("compress");
        let decompressed = compressor.decompress(&compressed, 0).expect("decompress");

        assert_eq!(compressed, original);
        assert_eq!(decompressed, original);
        assert!(!compressor.is_enabled());
    }

    #[test]
    fn test_for_flag_selects_compressor() {
        assert!(for_flag(true).is_enabled());
        assert!(!for_flag(false).is_enabled());
    }

    #[test]
    fn test_inflation_stops_at_limit() {
        let compressor = ZlibCompressor::default();
        let bomb = compressor.compress(&vec![0u8; 1 << 20]).unwrap();
        assert!(bomb.len() < 4096);

        let result = compressor.decompress(&bomb, 120);
        assert_eq!(
            result,
            Err(FilterError::SizeMismatch {
                expected: 120,
                actual: 121
            })
        );
    }

    #[test]
    fn test_output_exactly_at_limit_is_accepted() {
        let compressor = ZlibCompressor::default();
        let data = vec![7u8; 120];
        let out = compressor.compress(&data).unwrap();
        assert_eq!(compressor.decompress(&out, 120).unwrap(), data);
    }

    #[test]
    fn test_trailing_bytes_are_integrity_violation() {
        let compressor = ZlibCompressor::default();
        let mut stream = compressor.compress(&[3u8; 64]).unwrap();
        stream.extend_from_slice(&[0, 0]);

        assert!(matches!(
            compressor.decompress(&stream, 64),
            Err(FilterError::IntegrityViolation { .. })
        ));
    }
}
