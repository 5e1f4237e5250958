//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- optimal bits
//! - k = ceil((m/n) * ln(2))         -- optimal probe count
//! - words = ceil(m / 64)
//!
//! `k` is always rounded up so the configured error bound is never loosened.

use std::f64::consts::LN_2;

use crate::domain::bit_store::WORD_BITS;
use crate::error::FilterError;

/// Largest supported bit count.
///
/// The MURMUR rejection sampler draws from 31-bit magnitudes, so `m` has to
/// stay within the positive `i32` range.
pub const MAX_BITS: usize = i32::MAX as usize;

/// Derived sizing of a Bloom filter
///
/// Two filters are template-compatible iff `num_bits` and `num_probes` match;
/// the inputs (`ideal_element_count`, `error_rate`) may differ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParameters {
    /// Expected number of elements (n)
    pub ideal_element_count: u64,
    /// Target false positive rate (p)
    pub error_rate: f64,
    /// Size in bits (m)
    pub num_bits: usize,
    /// Number of probes per key (k)
    pub num_probes: usize,
    /// Number of 64-bit storage words covering `num_bits`
    pub num_words: usize,
}

impl FilterParameters {
    /// Derive m, k and the word count from (n, p)
    ///
    /// # Errors
    /// `InvalidParameter` if `n == 0`, `p` is not strictly inside (0, 1), or the
    /// resulting bit count exceeds [`MAX_BITS`].
    pub fn derive(ideal_element_count: u64, error_rate: f64) -> Result<Self, FilterError> {
        if ideal_element_count == 0 {
            return Err(FilterError::InvalidParameter(
                "ideal element count must be > 0".to_string(),
            ));
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(FilterError::InvalidParameter(format!(
                "error rate must be between 0 and 1 exclusive, got {error_rate}"
            )));
        }

        let num_bits = optimal_num_bits(ideal_element_count, error_rate);
        if num_bits > MAX_BITS as f64 {
            return Err(FilterError::InvalidParameter(format!(
                "filter would need {num_bits} bits, maximum is {MAX_BITS}"
            )));
        }
        let num_bits = num_bits as usize;
        let num_probes = optimal_num_probes(ideal_element_count, num_bits);

        Ok(Self {
            ideal_element_count,
            error_rate,
            num_bits,
            num_probes,
            num_words: num_words(num_bits),
        })
    }

    /// Whether two parameter sets describe the same bit layout
    pub fn template_matches(&self, other: &FilterParameters) -> bool {
        self.num_bits == other.num_bits && self.num_probes == other.num_probes
    }

    /// Size of the canonical raw byte encoding of the bit store
    pub fn num_bytes(&self) -> usize {
        self.num_words * (WORD_BITS / 8)
    }

    /// Expected false positive rate after `inserted` distinct keys
    pub fn expected_fpr(&self, inserted: u64) -> f64 {
        calculate_fpr(self.num_bits, inserted, self.num_probes)
    }
}

/// m = ceil(-n * ln(p) / ln(2)^2), kept as a float so callers can range-check it
fn optimal_num_bits(n: u64, p: f64) -> f64 {
    (-(n as f64) * p.ln() / (LN_2 * LN_2)).ceil()
}

/// k = ceil((m / n) * ln(2)) using real division
fn optimal_num_probes(n: u64, m: usize) -> usize {
    ((m as f64 / n as f64) * LN_2).ceil().max(1.0) as usize
}

/// Number of storage words covering `m` bits
pub fn num_words(m: usize) -> usize {
    m.div_ceil(WORD_BITS)
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: u64, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
