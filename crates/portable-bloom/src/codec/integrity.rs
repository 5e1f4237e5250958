//! # Payload Integrity
//!
//! The envelope digest is SHA-256 over the *uncompressed* raw bit-store bytes,
//! rendered as lowercase hex. A CRC32 checksum is logged alongside for quick
//! eyeballing; it is never part of the wire format.

use sha2::{Digest, Sha256};

use crate::error::FilterError;

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// CRC32 of `bytes` as lowercase hex without padding
pub fn crc32_hex(bytes: &[u8]) -> String {
    format!("{:x}", crc32fast::hash(bytes))
}

/// Verify `bytes` against a stored hex digest
///
/// Comparison is case-insensitive so digests written by other
/// implementations in uppercase hex are accepted.
pub fn verify_digest(bytes: &[u8], expected: &str) -> Result<(), FilterError> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(FilterError::IntegrityViolation {
            reason: format!("digest mismatch: expected {expected}, computed {actual}"),
        })
    }
}
