//! Tier sources for freshly spawned ships

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Picks the tier of the next armed ship
pub trait TierSource {
    /// Tier in `0..=max_tier`
    fn next_tier(&mut self, max_tier: u32) -> u32;
}

/// Uniform tiers from a seeded PCG stream
#[derive(Debug, Clone)]
pub struct SeededTiers {
    seed: u64,
    rng: Pcg32,
}

impl SeededTiers {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TierSource for SeededTiers {
    fn next_tier(&mut self, max_tier: u32) -> u32 {
        self.rng.random_range(0..=max_tier)
    }
}

/// Replays a fixed sequence verbatim, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedTiers {
    tiers: Vec<u32>,
    cursor: usize,
}

impl ScriptedTiers {
    pub fn new(tiers: impl Into<Vec<u32>>) -> Self {
        Self {
            tiers: tiers.into(),
            cursor: 0,
        }
    }

    /// Always the same tier
    pub fn constant(tier: u32) -> Self {
        Self::new(vec![tier])
    }
}

impl TierSource for ScriptedTiers {
    fn next_tier(&mut self, _max_tier: u32) -> u32 {
        if self.tiers.is_empty() {
            return 0;
        }
        let tier = self.tiers[self.cursor % self.tiers.len()];
        self.cursor += 1;
        tier
    }
}
