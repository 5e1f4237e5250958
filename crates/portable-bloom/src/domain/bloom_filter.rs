//! Core Bloom filter implementation
//!
//! INVARIANTS:
//! - No false negatives: after `add(x)`, `contains(x)` is `PossiblyPresent`
//! - Union/intersection only between template-compatible filters
//!   (equal bit count and probe count); on mismatch neither operand changes

use tracing::warn;

use super::bit_store::{BitOp, BitStore};
use super::config::BloomConfig;
use super::parameters::FilterParameters;
use super::probes::ProbeGenerator;
use crate::error::FilterError;

/// Result of a membership query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Membership {
    /// At least one probe hit an unset bit; the key was never added
    DefinitelyAbsent,
    /// Every probe hit a set bit; the key may have been added
    PossiblyPresent,
}

impl Membership {
    pub fn is_possibly_present(self) -> bool {
        self == Membership::PossiblyPresent
    }
}

/// Bloom filter for probabilistic membership testing
///
/// False positives are possible, false negatives are not. The filter is not
/// internally synchronized: mutate it from one thread at a time. Queries only
/// read the bit store and may run concurrently against a stable filter.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    params: FilterParameters,
    bits: BitStore,
    generator: ProbeGenerator,
}

impl BloomFilter {
    /// Create an empty filter sized for `ideal_element_count` keys at
    /// `error_rate`, probing with the default (MURMUR) generator
    pub fn new(ideal_element_count: u64, error_rate: f64) -> Result<Self, FilterError> {
        Self::with_generator(ideal_element_count, error_rate, ProbeGenerator::default())
    }

    /// Create an empty filter with an explicit probe generator
    pub fn with_generator(
        ideal_element_count: u64,
        error_rate: f64,
        generator: ProbeGenerator,
    ) -> Result<Self, FilterError> {
        let params = FilterParameters::derive(ideal_element_count, error_rate)?;
        Ok(Self {
            bits: BitStore::new(params.num_bits),
            params,
            generator,
        })
    }

    /// Create a filter over an existing word array
    ///
    /// # Errors
    /// `SizeMismatch` if `words` does not hold exactly the derived word count.
    pub fn with_words(
        ideal_element_count: u64,
        error_rate: f64,
        generator: ProbeGenerator,
        words: Vec<u64>,
    ) -> Result<Self, FilterError> {
        let params = FilterParameters::derive(ideal_element_count, error_rate)?;
        Ok(Self {
            bits: BitStore::from_words(words, params.num_bits)?,
            params,
            generator,
        })
    }

    /// Create an empty filter from a validated configuration
    pub fn from_config(config: &BloomConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Self::with_generator(config.ideal_element_count, config.error_rate, config.generator)
    }

    pub(crate) fn from_parts(
        params: FilterParameters,
        bits: BitStore,
        generator: ProbeGenerator,
    ) -> Self {
        Self {
            params,
            bits,
            generator,
        }
    }

    fn probes(&self, key: &str) -> Vec<usize> {
        self.generator
            .probes(self.params.num_probes, self.params.num_bits, key)
    }

    /// Insert a key
    pub fn add(&mut self, key: &str) {
        for position in self.probes(key) {
            self.bits.set_bit(position);
        }
    }

    /// Test whether a key may have been added
    ///
    /// Stops at the first unset probe bit.
    pub fn contains(&self, key: &str) -> Membership {
        if self
            .probes(key)
            .into_iter()
            .all(|position| self.bits.test_bit(position))
        {
            Membership::PossiblyPresent
        } else {
            Membership::DefinitelyAbsent
        }
    }

    /// Boolean shorthand for `contains(key).is_possibly_present()`
    pub fn might_contain(&self, key: &str) -> bool {
        self.contains(key).is_possibly_present()
    }

    /// Whether `other` shares this filter's bit count and probe count
    pub fn template_matches(&self, other: &BloomFilter) -> bool {
        self.params.template_matches(&other.params)
    }

    /// Replace this filter's bits with the OR of both filters
    ///
    /// Every key possibly present in either operand stays possibly present.
    pub fn union(&mut self, other: &BloomFilter) -> Result<(), FilterError> {
        self.combine(other, BitOp::Or)
    }

    /// Replace this filter's bits with the AND of both filters
    ///
    /// May report keys neither operand held (overlapping bits from different
    /// keys), but never sets a bit that is clear in either operand.
    pub fn intersection(&mut self, other: &BloomFilter) -> Result<(), FilterError> {
        self.combine(other, BitOp::And)
    }

    fn combine(&mut self, other: &BloomFilter, op: BitOp) -> Result<(), FilterError> {
        if !self.template_matches(other) {
            return Err(FilterError::TemplateMismatch {
                expected: (self.params.num_bits, self.params.num_probes),
                found: (other.params.num_bits, other.params.num_probes),
            });
        }
        if self.generator != other.generator {
            warn!(
                ours = %self.generator,
                theirs = %other.generator,
                ?op,
                "Combining filters built with different probe generators"
            );
        }
        self.bits = self.bits.combine(&other.bits, op)?;
        Ok(())
    }

    /// Reset the filter to empty
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Number of bits currently set
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Theoretical false positive rate after `inserted` distinct keys
    pub fn expected_false_positive_rate(&self, inserted: u64) -> f64 {
        self.params.expected_fpr(inserted)
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    pub fn ideal_element_count(&self) -> u64 {
        self.params.ideal_element_count
    }

    pub fn error_rate(&self) -> f64 {
        self.params.error_rate
    }

    /// Size in bits (m)
    pub fn num_bits(&self) -> usize {
        self.params.num_bits
    }

    /// Probes per key (k)
    pub fn num_probes(&self) -> usize {
        self.params.num_probes
    }

    pub fn num_words(&self) -> usize {
        self.params.num_words
    }

    pub fn generator(&self) -> ProbeGenerator {
        self.generator
    }

    /// Backing 64-bit words
    pub fn words(&self) -> &[u64] {
        self.bits.words()
    }

    /// Canonical big-endian byte layout of the bit store
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}
