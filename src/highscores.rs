//! High score table
//!
//! Receives the final score once a run is over. Kept in memory; storing it
//! anywhere is up to the frontend.

use serde::{Deserialize, Serialize};

use crate::sim::Engine;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Highest tier reached during the run
    pub max_tier: u32,
    /// Ticks the run lasted
    pub ticks: u64,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed), None if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score if it qualifies, returning the rank achieved
    pub fn add_score(&mut self, score: u64, max_tier: u32, ticks: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                max_tier,
                ticks,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Record a finished run; does nothing while the run is still going
    pub fn record_run(&mut self, engine: &Engine, ticks: u64) -> Option<usize> {
        let score = engine.final_score()?;
        let rank = self.add_score(score, engine.max_tier(), ticks);
        match rank {
            Some(rank) => log::info!("New high score #{}: {}", rank, score),
            None => log::info!("Run ended with {} (not a high score)", score),
        }
        rank
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
