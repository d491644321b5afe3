//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step only, driven by external `tick()` calls
//! - Injected, seedable tier source only
//! - Stable iteration order (registry sorted by ship id)
//! - No rendering, persistence or platform dependencies

pub mod collision;
pub mod footprint;
pub mod grid;
pub mod rect;
pub mod state;
pub mod tick;
pub mod tiers;

pub use collision::{BounceResult, bounce_velocities};
pub use footprint::{FootprintLookup, ScaledFootprints};
pub use grid::{CellCoord, GridCell, SpatialGrid};
pub use rect::Rect;
pub use state::{Board, Engine, Ship, ShipId, ShipSnapshot};
pub use tick::{can_enter_zone, tick};
pub use tiers::{ScriptedTiers, SeededTiers, TierSource};
