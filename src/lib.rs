//! Spaceship Merge - simulation engine for a 2D merge arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, spatial grid, collisions, game state)
//! - `settings`: Data-driven engine tuning
//! - `highscores`: Final-score table fed once a run ends

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;
pub use sim::Engine;

/// Game configuration constants
pub mod consts {
    /// Reference tick cadence of the external clock (milliseconds)
    pub const TICK_INTERVAL_MS: u64 = 30;

    /// Below this speed on both axes a launched ship is considered at rest
    pub const MIN_SPEED: f32 = 0.1;
    /// Denominator floor for the bounce normal
    pub const MIN_NORMAL_LENGTH: f32 = 0.01;

    /// Base ship edge as a fraction of board width
    pub const SHIP_BASE_FRACTION: f32 = 0.1;
    /// Per-tier growth of the ship edge
    pub const SHIP_TIER_SCALE: f32 = 1.25;
}

/// Reflect a vector across a unit normal: `R = V - 2(V·N)N`
#[inline]
pub fn reflect(v: glam::Vec2, normal: glam::Vec2) -> glam::Vec2 {
    v - 2.0 * v.dot(normal) * normal
}
