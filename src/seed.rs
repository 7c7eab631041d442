//! Per-worker seed generation.
//!
//! Seeds are produced up front, before any worker is spawned, so seeding
//! never races with sampling.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Result;

/// Odd mixing constant (2^64 / golden ratio). Multiplying by an odd value is
/// a bijection modulo 2^64, which keeps ordinal offsets distinct.
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Raw entropy, read once per worker at seeding time.
pub trait EntropySource {
    fn next_u32(&mut self) -> Result<u32>;
}

/// Operating-system entropy via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        OsRng.try_fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

pub struct SeedDistributor<E> {
    entropy: E,
}

impl<E: EntropySource> SeedDistributor<E> {
    pub fn new(entropy: E) -> Self {
        Self { entropy }
    }

    /// Produce `count` pairwise-distinct, non-zero seeds.
    ///
    /// Each seed takes two entropy reads and is xor-ed with the worker's
    /// ordinal times an odd constant, so identical entropy across all
    /// reads still yields distinct seeds.
    pub fn distribute(&mut self, count: usize) -> Result<Vec<u64>> {
        let mut seeds = Vec::with_capacity(count);
        for index in 0..count {
            let high = u64::from(self.entropy.next_u32()?);
            let low = u64::from(self.entropy.next_u32()?);
            seeds.push(mix(index, (high << 32) | low));
        }
        Ok(seeds)
    }
}

fn mix(index: usize, raw: u64) -> u64 {
    let ordinal = (index as u64 + 1).wrapping_mul(GOLDEN);
    match raw ^ ordinal {
        0 => ordinal,
        seed => seed,
    }
}
