//! MURMUR probe generator
//!
//! Hashes the key with 32-bit MurmurHash2, then keeps re-hashing a mutated
//! copy of the key (treated as a big-endian counter) until `k` digests have
//! survived rejection sampling. Rejection sampling removes the modulo bias
//! of a plain `abs(hash) % m`.

/// Stable registry name
pub const NAME: &str = "MURMUR";

/// Seed shared by every implementation of this format
pub const SEED: u32 = 89_478_583;

// Mixing constants from the reference MurmurHash2
const MIX: u32 = 0x5bd1_e995;
const SHIFT: u32 = 24;

/// 32-bit MurmurHash2 (little-endian block reads)
pub fn murmur2(data: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ data.len() as u32;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(MIX);
        k ^= k >> SHIFT;
        k = k.wrapping_mul(MIX);

        h = h.wrapping_mul(MIX);
        h ^= k;
    }

    let tail = blocks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(MIX);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(MIX);
    h ^= h >> 15;
    h
}

/// Map a digest into `[0, m)` without modulo bias
///
/// The digest is read as a signed 32-bit value. `i32::MIN` has no absolute
/// value and magnitudes in the tail above the largest multiple of `m` are
/// rejected.
pub fn rejection_sample(hash: u32, m: usize) -> Option<usize> {
    let magnitude = (hash as i32).checked_abs()? as u32;
    let m = m as u32;
    let limit = i32::MAX as u32 - (i32::MAX as u32 % m);
    if magnitude > limit {
        None
    } else {
        Some((magnitude % m) as usize)
    }
}

/// Increment `counter` as an unbounded big-endian integer
///
/// A carry out of the first byte prepends `0x01`, so even an empty key keeps
/// producing fresh inputs.
pub fn increment_counter(counter: &mut Vec<u8>) {
    for byte in counter.iter_mut().rev() {
        let (next, overflowed) = byte.overflowing_add(1);
        *byte = next;
        if !overflowed {
            return;
        }
    }
    counter.insert(0, 1);
}

/// Produce `k` probe indices in `[0, m)` for `key`
pub fn probes(k: usize, m: usize, key: &[u8]) -> Vec<usize> {
    debug_assert!(m > 0 && m <= i32::MAX as usize, "bit count out of range");

    let mut positions = Vec::with_capacity(k);
    let mut counter = key.to_vec();
    while positions.len() < k {
        if let Some(position) = rejection_sample(murmur2(&counter, SEED), m) {
            positions.push(position);
        }
        increment_counter(&mut counter);
    }
    positions
}
