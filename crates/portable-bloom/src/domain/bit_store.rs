//! Fixed-size bit store backed by 64-bit words
//!
//! Addressing: bit `i` lives in word `i / 64` at shift `i % 64`
//! (`Lsb0` ordering). The canonical byte form is every word in big-endian
//! order, concatenated. That layout is part of the wire format.

use bitvec::prelude::*;

use crate::domain::parameters::num_words;
use crate::error::FilterError;

/// Width of one storage word in bits
pub const WORD_BITS: usize = u64::BITS as usize;

const WORD_BYTES: usize = WORD_BITS / 8;

/// Word-wise boolean combination
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOp {
    Or,
    And,
}

impl BitOp {
    fn apply(self, a: u64, b: u64) -> u64 {
        match self {
            BitOp::Or => a | b,
            BitOp::And => a & b,
        }
    }
}

/// Bit array storing the filter state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitStore {
    bits: BitVec<u64, Lsb0>,
}

impl BitStore {
    /// All-zero store addressing `num_bits` bits
    pub fn new(num_bits: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; num_bits],
        }
    }

    /// Adopt an existing word array
    ///
    /// Fails with `SizeMismatch` unless `words` covers exactly `num_bits`.
    pub fn from_words(words: Vec<u64>, num_bits: usize) -> Result<Self, FilterError> {
        let expected = num_words(num_bits);
        if words.len() != expected {
            return Err(FilterError::SizeMismatch {
                expected: expected * WORD_BYTES,
                actual: words.len() * WORD_BYTES,
            });
        }
        let mut bits = BitVec::<u64, Lsb0>::from_vec(words);
        bits.truncate(num_bits);
        Ok(Self { bits })
    }

    /// Parse the canonical big-endian byte layout
    pub fn from_bytes(bytes: &[u8], num_bits: usize) -> Result<Self, FilterError> {
        let expected = num_words(num_bits) * WORD_BYTES;
        if bytes.len() != expected {
            return Err(FilterError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let words = bytes
            .chunks_exact(WORD_BYTES)
            .map(|chunk| {
                let mut word = [0u8; WORD_BYTES];
                word.copy_from_slice(chunk);
                u64::from_be_bytes(word)
            })
            .collect();
        Self::from_words(words, num_bits)
    }

    /// Canonical byte layout: each word big-endian, concatenated
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words().iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    /// Set bit `index`
    ///
    /// # Panics
    /// Panics if `index` is outside the store. Probe generators only produce
    /// indices in `[0, num_bits)`.
    pub fn set_bit(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    /// Test bit `index`
    pub fn test_bit(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Word-wise combination into a new store; neither operand is modified
    pub fn combine(&self, other: &BitStore, op: BitOp) -> Result<BitStore, FilterError> {
        if self.bits.len() != other.bits.len() {
            return Err(FilterError::SizeMismatch {
                expected: self.words().len() * WORD_BYTES,
                actual: other.words().len() * WORD_BYTES,
            });
        }
        let words = self
            .words()
            .iter()
            .zip(other.words())
            .map(|(&a, &b)| op.apply(a, b))
            .collect();
        Self::from_words(words, self.bits.len())
    }

    /// Backing words
    pub fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    /// Number of addressable bits
    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Reset every bit to 0, including spare bits past `num_bits` in the
    /// last word
    pub fn clear(&mut self) {
        self.bits.as_raw_mut_slice().fill(0);
    }
}
