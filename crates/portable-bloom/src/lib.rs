//! # Portable Bloom
//!
//! A Bloom filter whose bit layout and probe sequences are fully specified,
//! so filters can be built in one process (or language) and queried in
//! another through a versioned, integrity-checked JSON envelope.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `FilterParameters`: (n, p) -> (bits, probes, words)
//!   - `BitStore`: 64-bit words, bit `i` in word `i / 64`
//!   - `ProbeGenerator`: `MURMUR` and `MERSENNE` probe sequences
//!   - `BloomFilter`: add / contains / union / intersection
//!   - `BloomConfig`, `BloomConfigBuilder`: validated configuration
//!
//! - **Codec Layer** (`codec/`): Envelope encoding
//!   - `Envelope`: the wire record (`v`, `n`, `p`, `zlib`, `data`, `hash`, `gen`)
//!   - `encode` / `decode`: base64, optional zlib, SHA-256 over raw bytes
//!
//! ## Invariants
//!
//! - No false negatives: once added, `contains()` MUST report `PossiblyPresent`
//! - Union/intersection require equal bit and probe counts
//! - Decode never accepts a payload whose SHA-256 disagrees with `hash`
//!
//! ## Usage Example
//!
//! ```
//! use portable_bloom::{BloomFilter, Membership, ProbeGenerator};
//!
//! let mut filter = BloomFilter::with_generator(10_000, 0.001, ProbeGenerator::Murmur)?;
//! filter.add("Alabama");
//! assert_eq!(filter.contains("Alabama"), Membership::PossiblyPresent);
//!
//! let json = filter.to_json(true)?;
//! let restored = BloomFilter::from_json(&json)?;
//! assert_eq!(restored.to_bytes(), filter.to_bytes());
//! # Ok::<(), portable_bloom::FilterError>(())
//! ```

pub mod codec;
pub mod domain;
pub mod error;

// Re-exports for convenience
pub use codec::{decode, encode, Envelope, VERSION};
pub use domain::{
    BitStore, BloomConfig, BloomConfigBuilder, BloomFilter, FilterParameters, Membership,
    ProbeGenerator,
};
pub use error::FilterError;
