use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform integer draws over inclusive ranges.
///
/// Every random decision the engine makes goes through this trait so a host can
/// inject a seeded source and replay a session exactly.
pub trait RandomSource {
    fn roll_range(&mut self, min: i64, max: i64) -> i64;

    /// `true` with probability `chance`/100, rolled as `roll_range(1, 100) <= chance`.
    fn roll_percent(&mut self, chance: u32) -> bool {
        self.roll_range(1, 100) <= i64::from(chance.min(100))
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let max = i64::try_from(len - 1).unwrap_or(i64::MAX);
        usize::try_from(self.roll_range(0, max)).ok()
    }
}

#[derive(Debug, Clone)]
pub struct EngineRng {
    inner: SmallRng,
}

impl EngineRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: SmallRng::from_entropy(),
        }
    }
}

impl Default for EngineRng {
    fn default() -> Self {
        Self::from_seed(0x9e3779b97f4a7c15)
    }
}

impl RandomSource for EngineRng {
    fn roll_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..=max)
    }
}
