//! Randomness seam for configuration derivation.
//!
//! Anything that derives machine settings draws from a [`RandomSource`]
//! passed in explicitly, never from process-wide random state. The default
//! methods fix how raw 64-bit words become bounded choices, so two sources
//! producing the same words always produce the same derived configuration.

/// Source of pseudorandom 64-bit words.
pub trait RandomSource {
    /// Returns the next 64-bit word.
    fn next_u64(&mut self) -> u64;

    /// Returns a uniformly distributed value in `[0, bound)`.
    ///
    /// Uses rejection sampling on 63-bit draws to avoid modulo bias.
    /// Returns 0 when `bound` is 0.
    fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let n = bound as u64;
        let limit = u64::MAX >> 1;
        loop {
            let bits = self.next_u64() >> 1;
            let val = bits % n;
            // Reject draws from the incomplete last bucket.
            if bits - val <= limit - (n - 1) {
                return val as usize;
            }
        }
    }

    /// Returns a uniformly distributed value in `[low, high]`.
    fn next_in_range(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        low + self.next_below(high - low + 1)
    }
}

/// Shuffles `items` in place with a Fisher-Yates pass driven by `rng`.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i + 1);
        items.swap(i, j);
    }
}

/// Removes and returns a uniformly chosen element of `items`.
///
/// Returns `None` if `items` is empty.
pub fn take_one<T>(rng: &mut dyn RandomSource, items: &mut Vec<T>) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let k = rng.next_below(items.len());
    Some(items.remove(k))
}
