//! Seed-string to generator key conversion.
//!
//! A seed string is hashed with SHA-256 and the digest, read as four
//! big-endian 64-bit words, keys a [`MersenneTwister`]. Every byte of the
//! seed therefore influences the whole derived configuration, and the
//! mapping is stable across platforms.

use sha2::{Digest, Sha256};

use super::mersenne_twister::MersenneTwister;
use crate::error::{BitnigmaError, Result};

/// Generator key derived from a seed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedKey {
    words: [u64; 4],
}

impl SeedKey {
    /// Derives the key for `seed`.
    ///
    /// # Errors
    /// Returns [`BitnigmaError::EmptySeed`] if `seed` is empty.
    pub fn new(seed: &str) -> Result<Self> {
        if seed.is_empty() {
            return Err(BitnigmaError::EmptySeed);
        }
        let digest = Sha256::digest(seed.as_bytes());
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_be_bytes(bytes);
        }
        Ok(SeedKey { words })
    }

    /// The four key words.
    pub fn words(&self) -> &[u64; 4] {
        &self.words
    }

    /// A fresh generator keyed by this seed.
    pub fn generator(&self) -> MersenneTwister {
        MersenneTwister::with_key(&self.words)
    }
}
