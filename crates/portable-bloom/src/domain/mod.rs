//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Parameter calculation
//! - The 64-bit word bit store
//! - Probe generators (MURMUR, MERSENNE)
//! - The Bloom filter engine
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod bit_store;
pub mod bloom_filter;
pub mod config;
pub mod parameters;
pub mod probes;

pub use bit_store::{BitOp, BitStore, WORD_BITS};
pub use bloom_filter::{BloomFilter, Membership};
pub use config::{BloomConfig, BloomConfigBuilder};
pub use parameters::{calculate_fpr, FilterParameters, MAX_BITS};
pub use probes::ProbeGenerator;
