//! 64-bit Mersenne Twister PRNG (MT19937-64).
//!
//! Provides a high-period (2^19937 - 1) pseudorandom number generator with
//! fully deterministic output for a given seed or key array. The machine
//! seeding derivation depends on this sequence never changing.

use super::source::RandomSource;

const NN: usize = 312;
const MM: usize = 156;
const MATRIX_A: u64 = 0xB502_6F5A_A966_19E9;
const UM: u64 = 0xFFFF_FFFF_8000_0000; // upper 33 bits
const LM: u64 = 0x7FFF_FFFF; // lower 31 bits

/// 64-bit Mersenne Twister PRNG with period 2^19937-1.
///
/// There is no time-based constructor: every instance is created from an
/// explicit seed so that derived machine configurations are reproducible.
#[derive(Clone)]
pub struct MersenneTwister {
    mt: [u64; NN],
    mti: usize,
}

impl MersenneTwister {
    /// Creates a generator from a single 64-bit seed.
    ///
    /// # Parameters
    /// - `seed`: The seed value for deterministic output.
    pub fn with_seed(seed: u64) -> Self {
        let mut mt = MersenneTwister {
            mt: [0u64; NN],
            mti: NN + 1,
        };
        mt.init_genrand64(seed);
        mt
    }

    /// Creates a generator from a key array.
    ///
    /// Uses every word of `key`, so longer keys (such as a full digest)
    /// select among far more initial states than a single seed.
    pub fn with_key(key: &[u64]) -> Self {
        let mut mt = Self::with_seed(19_650_218);
        if key.is_empty() {
            return mt;
        }
        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..NN.max(key.len()) {
            let prev = mt.mt[i - 1];
            mt.mt[i] = (mt.mt[i]
                ^ (prev ^ (prev >> 62)).wrapping_mul(3_935_559_000_370_003_845))
            .wrapping_add(key[j])
            .wrapping_add(j as u64);
            i += 1;
            j += 1;
            if i >= NN {
                mt.mt[0] = mt.mt[NN - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..(NN - 1) {
            let prev = mt.mt[i - 1];
            mt.mt[i] = (mt.mt[i]
                ^ (prev ^ (prev >> 62)).wrapping_mul(2_862_933_555_777_941_757))
            .wrapping_sub(i as u64);
            i += 1;
            if i >= NN {
                mt.mt[0] = mt.mt[NN - 1];
                i = 1;
            }
        }
        // MSB is 1, assuring a non-zero initial array.
        mt.mt[0] = 1u64 << 63;
        mt
    }

    /// Initializes the state vector from the seed.
    fn init_genrand64(&mut self, seed: u64) {
        self.mt[0] = seed;
        for i in 1..NN {
            let prev = self.mt[i - 1];
            self.mt[i] = 6_364_136_223_846_793_005u64
                .wrapping_mul(prev ^ (prev >> 62))
                .wrapping_add(i as u64);
        }
        self.mti = NN;
    }

    /// Regenerates the whole state block.
    fn twist(&mut self) {
        let mag01: [u64; 2] = [0, MATRIX_A];
        for i in 0..(NN - MM) {
            let x = (self.mt[i] & UM) | (self.mt[i + 1] & LM);
            self.mt[i] = self.mt[i + MM] ^ (x >> 1) ^ mag01[(x & 1) as usize];
        }
        for i in (NN - MM)..(NN - 1) {
            let x = (self.mt[i] & UM) | (self.mt[i + 1] & LM);
            self.mt[i] = self.mt[i + MM - NN] ^ (x >> 1) ^ mag01[(x & 1) as usize];
        }
        let x = (self.mt[NN - 1] & UM) | (self.mt[0] & LM);
        self.mt[NN - 1] = self.mt[MM - 1] ^ (x >> 1) ^ mag01[(x & 1) as usize];
        self.mti = 0;
    }

    /// Generates the next 64-bit pseudorandom value.
    pub fn next_long(&mut self) -> u64 {
        if self.mti >= NN {
            self.twist();
        }

        let mut x = self.mt[self.mti];
        self.mti += 1;

        // Tempering
        x ^= (x >> 29) & 0x5555_5555_5555_5555;
        x ^= (x << 17) & 0x71D6_7FFF_EDA6_0000;
        x ^= (x << 37) & 0xFFF7_EEE0_0000_0000;
        x ^= x >> 43;
        x
    }
}

impl RandomSource for MersenneTwister {
    fn next_u64(&mut self) -> u64 {
        self.next_long()
    }
}
