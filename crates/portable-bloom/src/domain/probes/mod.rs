//! Probe generators
//!
//! A probe generator maps a key to `k` ordered bit indices in `[0, m)`.
//! Output depends only on `(k, m, key)`, so filters built by different
//! processes or implementations agree bit-for-bit.
//!
//! The set of generators is closed; each variant is registered under a
//! stable name that is written into serialized envelopes.

pub mod mersenne;
pub mod murmur;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Available probe generation algorithms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProbeGenerator {
    /// MurmurHash2 with counter mutation and rejection sampling
    #[default]
    Murmur,
    /// Double hashing over two Mersenne-prime rolling hashes
    Mersenne,
}

impl ProbeGenerator {
    /// Every registered generator
    pub const ALL: [ProbeGenerator; 2] = [ProbeGenerator::Murmur, ProbeGenerator::Mersenne];

    /// Registry name written to envelopes
    pub fn name(&self) -> &'static str {
        match self {
            ProbeGenerator::Murmur => murmur::NAME,
            ProbeGenerator::Mersenne => mersenne::NAME,
        }
    }

    /// Resolve a registry name
    ///
    /// # Errors
    /// `UnknownGenerator` if no generator is registered under `name`.
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        Self::ALL
            .into_iter()
            .find(|generator| generator.name() == name)
            .ok_or_else(|| FilterError::UnknownGenerator(name.to_string()))
    }

    /// Compute `k` probe indices in `[0, m)` for `key`
    pub fn probes(&self, k: usize, m: usize, key: &str) -> Vec<usize> {
        match self {
            ProbeGenerator::Murmur => murmur::probes(k, m, key.as_bytes()),
            ProbeGenerator::Mersenne => mersenne::probes(k, m, key),
        }
    }
}

impl fmt::Display for ProbeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProbeGenerator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for ProbeGenerator {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<ProbeGenerator> for String {
    fn from(generator: ProbeGenerator) -> Self {
        generator.name().to_string()
    }
}
