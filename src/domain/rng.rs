/// Level generation RNG: an explicitly owned, injectable uniform-integer
/// sampler. Platform placement math works in floats, so samples come back
/// as `f32` even though the underlying distribution is over integers.
///
/// Backed by PCG so a fixed seed reproduces an identical platform sequence
/// (tests, replays). Without a configured seed, the generator is seeded
/// from OS entropy.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub struct LevelRng {
    inner: Pcg32,
}

impl LevelRng {
    /// Seed from config, or entropy when no seed is given.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self::seeded(seed)
    }

    pub fn seeded(seed: u64) -> Self {
        LevelRng { inner: Pcg32::seed_from_u64(seed) }
    }

    /// Uniform integer in `[low, high]` (inclusive), as f32.
    pub fn range(&mut self, low: i32, high: i32) -> f32 {
        debug_assert!(low <= high, "empty sample range {low}..={high}");
        self.inner.random_range(low..=high) as f32
    }
}
