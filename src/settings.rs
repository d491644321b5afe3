//! Engine tuning and preferences
//!
//! Loaded from a JSON file by the driver; every field has a default so a
//! partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gameplay ===
    /// Ships halt on the axis they are clamped on
    pub sticky_mode: bool,
    /// Upward speed given on launch (units per tick)
    pub launch_speed: f32,
    /// Per-tick velocity multiplier inside the zone
    pub damping: f32,
    /// Highest tier a fresh spawn can roll (inclusive)
    pub spawn_tier_max: u32,
    /// Distance of the launch slot above the bottom of the board
    pub launch_offset: f32,

    // === Collisions ===
    /// Added to the largest footprint edge to get the grid cell size
    pub grid_margin: f32,
    /// How far each ship is pushed along the normal after a bounce
    pub bounce_offset: f32,
    /// Fraction of the other ship's velocity an inert ship sends back
    pub inert_rebound: f32,

    // === Scoring ===
    pub entry_bonus_per_tier: u64,
    pub merge_bonus: u64,
    pub merge_bonus_per_tier: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sticky_mode: false,
            launch_speed: 50.0,
            damping: 0.97,
            spawn_tier_max: 2,
            launch_offset: 200.0,

            grid_margin: 100.0,
            bounce_offset: 5.0,
            inert_rebound: 0.8,

            entry_bonus_per_tier: 100,
            merge_bonus: 500,
            merge_bonus_per_tier: 100,
        }
    }
}

impl Settings {
    /// Score for a ship of `tier` fully entering the zone
    pub fn entry_bonus(&self, tier: u32) -> u64 {
        self.entry_bonus_per_tier * (tier as u64 + 1)
    }

    /// Score for a merge producing a ship of `new_tier`
    pub fn merge_score(&self, new_tier: u32) -> u64 {
        self.merge_bonus + self.merge_bonus_per_tier * (new_tier as u64 + 1)
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}
