//! MERSENNE probe generator
//!
//! Two rolling hashes over the key's code points,
//! `acc += ((acc + value + a) * b) % c`, each parameterised by a triple of
//! Mersenne primes. Probe `j` (1-based) is `(j * h2 + h1) % m`.
//! Accumulators are arbitrary precision and grow with the key length.

use std::sync::LazyLock;

use num_bigint::BigUint;

/// Stable registry name
pub const NAME: &str = "MERSENNE";

/// (offset, multiplier, modulus) for one rolling hash
struct PrimeTriple {
    offset: BigUint,
    multiplier: BigUint,
    modulus: BigUint,
}

impl PrimeTriple {
    fn from_exponents([a, b, c]: [usize; 3]) -> Self {
        Self {
            offset: mersenne(a),
            multiplier: mersenne(b),
            modulus: mersenne(c),
        }
    }
}

/// 2^17-1, 2^31-1, 2^127-1
static FIRST: LazyLock<PrimeTriple> = LazyLock::new(|| PrimeTriple::from_exponents([17, 31, 127]));

/// 2^19-1, 2^67-1, 2^257-1
static SECOND: LazyLock<PrimeTriple> =
    LazyLock::new(|| PrimeTriple::from_exponents([19, 67, 257]));

fn mersenne(exponent: usize) -> BigUint {
    (BigUint::from(1u8) << exponent) - 1u8
}

fn rolling_hash(values: &[u32], primes: &PrimeTriple) -> BigUint {
    let mut acc = BigUint::default();
    for &value in values {
        let term = ((&acc + value + &primes.offset) * &primes.multiplier) % &primes.modulus;
        acc += term;
    }
    acc
}

/// Low 64 bits of a value already reduced below `m`
fn low_word(value: &BigUint) -> u64 {
    value.iter_u64_digits().next().unwrap_or(0)
}

/// Produce `k` probe indices in `[0, m)` for `key`
pub fn probes(k: usize, m: usize, key: &str) -> Vec<usize> {
    debug_assert!(m > 0, "bit count out of range");

    let values: Vec<u32> = key.chars().map(u32::from).collect();
    let modulus = BigUint::from(m);

    // (j*h2 + h1) mod m == (j*(h2 mod m) + (h1 mod m)) mod m
    let h1 = u128::from(low_word(&(rolling_hash(&values, &FIRST) % &modulus)));
    let h2 = u128::from(low_word(&(rolling_hash(&values, &SECOND) % &modulus)));
    let m = m as u128;

    (1..=k as u128)
        .map(|j| ((j * h2 + h1) % m) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_tables() {
        assert_eq!(FIRST.offset, BigUint::from(131_071u32));
        assert_eq!(FIRST.multiplier, BigUint::from(2_147_483_647u32));
        assert_eq!(SECOND.offset, BigUint::from(524_287u32));
        assert_eq!(SECOND.multiplier, BigUint::from((1u128 << 67) - 1));
        assert_eq!(FIRST.modulus.bits(), 127);
        assert_eq!(SECOND.modulus.bits(), 257);
    }

    #[test]
    fn test_probes_pinned_values() {
        assert_eq!(probes(7, 959, "Alabama"), vec![734, 336, 897, 499, 101, 662, 264]);
        assert_eq!(
            probes(10, 14_377_588, "Texas"),
            vec![
                8_868_724, 12_050_037, 853_762, 4_035_075, 7_216_388, 10_397_701, 13_579_014,
                2_382_739, 5_564_052, 8_745_365
            ]
        );
    }

    #[test]
    fn test_uses_code_points() {
        assert_eq!(probes(3, 1000, "é"), vec![728, 768, 808]);
    }

    #[test]
    fn test_empty_key_hashes_to_zero() {
        assert_eq!(probes(3, 1000, ""), vec![0, 0, 0]);
    }

    #[test]
    fn test_long_key_stays_in_range() {
        let key = "x".repeat(10_000);
        let positions = probes(12, 4099, &key);
        assert_eq!(positions.len(), 12);
        assert!(positions.iter().all(|&p| p < 4099));
    }
}
