//! Error types for the portable Bloom filter

use thiserror::Error;

/// Errors that can occur while building, combining or (de)serializing filters
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "Mismatched bloom filters: expected (bits={}, probes={}), found (bits={}, probes={})",
        .expected.0, .expected.1, .found.0, .found.1
    )]
    TemplateMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Unknown probe generator: {0}")]
    UnknownGenerator(String),

    #[error("Invalid bloom filter envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Incompatible envelope version: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("Data integrity error: {reason}")]
    IntegrityViolation { reason: String },

    #[error("Bit store size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
