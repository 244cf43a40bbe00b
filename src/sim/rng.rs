//! Random streams
//!
//! Two structurally separate generators:
//! - `SeededRng` drives everything that affects scoring (lanes, hazard kinds,
//!   slow-zone lengths, drop rolls). Same seed + same call sequence = same run.
//! - `CosmeticRng` is unseeded and only picks visual variety. It never touches
//!   the seeded cursor.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Deterministic generator shared by every player in a scoring period
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    draws: u64,
    rng: Pcg32,
}

/// Serializable position of a `SeededRng` in its stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCursor {
    pub seed: u64,
    pub draws: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restart the stream from `seed`
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Rebuild a generator at a saved cursor by replaying its draws
    pub fn from_cursor(cursor: RngCursor) -> Self {
        let mut rng = Self::new(cursor.seed);
        for _ in 0..cursor.draws {
            rng.next();
        }
        rng
    }

    pub fn cursor(&self) -> RngCursor {
        RngCursor {
            seed: self.seed,
            draws: self.draws,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [0, 1)
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random::<f32>()
    }

    /// Uniform float in [lo, hi)
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next()
    }

    /// Uniform index in [0, n). Returns 0 for n == 0 without drawing.
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next() * n as f32) as usize).min(n - 1)
    }

    /// Fisher-Yates shuffle driven by `next()`
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

/// Unseeded generator for cosmetic choices only
#[derive(Debug, Clone)]
pub struct CosmeticRng {
    rng: SmallRng,
}

impl Default for CosmeticRng {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmeticRng {
    /// Seed from the thread-local entropy source
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Fixed-seed variant for tests and replays that want stable visuals
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Pick one of `count` skins
    pub fn skin(&mut self, count: u8) -> u8 {
        if count == 0 {
            return 0;
        }
        self.rng.random_range(0..count)
    }
}
