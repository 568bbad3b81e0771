//! Block selection - the engine's only source of randomness.
//!
//! Everything downstream of [`BlockPicker::pick`] is deterministic, so a
//! seeded or fixed picker reproduces a run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Chooses one of `candidates` resting blocks.
pub trait BlockPicker {
    /// Returns an index in `0..candidates`. `candidates` is never zero.
    fn pick(&mut self, candidates: usize) -> usize;
}

/// Uniform selection from a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededPicker {
    rng: ChaCha8Rng,
}

impl SeededPicker {
    /// Creates a picker from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl BlockPicker for SeededPicker {
    fn pick(&mut self, candidates: usize) -> usize {
        self.rng.gen_range(0..candidates)
    }
}

/// Always returns index `k` (wrapped to the candidate count).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedPicker {
    k: usize,
}

impl FixedPicker {
    /// Creates a picker that always chooses `k`.
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self { k }
    }
}

impl BlockPicker for FixedPicker {
    fn pick(&mut self, candidates: usize) -> usize {
        self.k % candidates
    }
}
