//! Engine state: ships, registry and the launch controller
//!
//! Ships live in a dense, insertion-ordered `Vec`. Ids are allocated
//! monotonically and never reused, so the registry is always sorted by id
//! and grid cells can refer to ships by id.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::footprint::FootprintLookup;
use super::grid::{CellCoord, SpatialGrid};
use super::rect::Rect;
use super::tiers::TierSource;
use crate::settings::Settings;

pub type ShipId = u32;

/// Board dimensions in screen units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
    /// Strip at the top reserved for UI; ships bounce off its lower edge
    pub top_bar: f32,
}

impl Board {
    pub fn new(width: f32, height: f32, top_bar: f32) -> Self {
        Self {
            width,
            height,
            top_bar,
        }
    }

    /// Boundary between the launch region (below) and the zone (above)
    #[inline]
    pub fn midline(&self) -> f32 {
        self.height / 2.0
    }
}

/// A ship entity
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: ShipId,
    /// Center
    pub pos: Vec2,
    /// Per-tick delta
    pub vel: Vec2,
    /// Footprint (width, height), fixed at creation
    pub size: Vec2,
    pub tier: u32,
    /// False once merged away
    pub visible: bool,
    pub launched: bool,
    /// Fully inside the anti-gravity zone
    pub in_zone: bool,
    /// Grid cells this ship is registered in (empty until in zone)
    pub member_cells: Vec<CellCoord>,
}

impl Ship {
    fn new(id: ShipId, pos: Vec2, size: Vec2, tier: u32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            size,
            tier,
            visible: true,
            launched: false,
            in_zone: false,
            member_cells: Vec::new(),
        }
    }

    /// Bounding rect, always derived from the current position
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    pub fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            id: self.id,
            tier: self.tier,
            rect: self.rect(),
            launched: self.launched,
            in_zone: self.in_zone,
        }
    }
}

/// Read-only view of a ship for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub id: ShipId,
    pub tier: u32,
    pub rect: Rect,
    pub launched: bool,
    pub in_zone: bool,
}

/// The simulation aggregate
pub struct Engine {
    pub(crate) board: Board,
    pub(crate) settings: Settings,
    launch_position: Vec2,
    footprints: Box<dyn FootprintLookup>,
    tiers: Box<dyn TierSource>,
    /// Registry (sorted by id)
    pub(crate) ships: Vec<Ship>,
    pub(crate) grid: SpatialGrid,
    armed: Option<ShipId>,
    pub(crate) max_tier: u32,
    pub(crate) score: u64,
    pub(crate) game_over: bool,
    next_id: ShipId,
}

impl Engine {
    /// Create an engine and arm a first ship rolled from `tiers`
    pub fn new(
        board: Board,
        footprints: impl FootprintLookup + 'static,
        mut tiers: impl TierSource + 'static,
        settings: Settings,
    ) -> Self {
        let initial_tier = tiers.next_tier(settings.spawn_tier_max);
        Self::with_initial_tier(board, footprints, tiers, settings, initial_tier)
    }

    /// Create an engine whose first armed ship has `initial_tier`
    pub fn with_initial_tier(
        board: Board,
        footprints: impl FootprintLookup + 'static,
        tiers: impl TierSource + 'static,
        settings: Settings,
        initial_tier: u32,
    ) -> Self {
        let launch_position = Vec2::new(board.width / 2.0, board.height - settings.launch_offset);
        let cell_size = footprints
            .footprint(0)
            .map_or(settings.grid_margin, |size| settings.grid_margin + size.max_element());
        let mut engine = Self {
            board,
            settings,
            launch_position,
            footprints: Box::new(footprints),
            tiers: Box::new(tiers),
            ships: Vec::new(),
            grid: SpatialGrid::new(board.width, board.midline(), cell_size),
            armed: None,
            max_tier: 0,
            score: 0,
            game_over: false,
            next_id: 0,
        };
        engine.arm_next_ship(initial_tier);

        log::info!(
            "Engine created: {}x{} board, midline {}, cell size {}",
            board.width,
            board.height,
            board.midline(),
            engine.grid.cell_size()
        );
        engine
    }

    /// Clear all mutable state and arm a fresh ship
    ///
    /// Ids keep counting up across resets.
    pub fn reset(&mut self) {
        self.ships.clear();
        self.armed = None;
        self.max_tier = 0;
        self.score = 0;
        self.game_over = false;
        let size = self.cell_size_for(0).unwrap_or(self.settings.grid_margin);
        self.grid.rebuild(size);

        let tier = self.tiers.next_tier(self.settings.spawn_tier_max);
        self.arm_next_ship(tier);
        log::info!("Engine reset, first tier {}", tier);
    }

    // === Queries ===

    /// Board dimensions the engine was built for
    pub fn board(&self) -> Board {
        self.board
    }

    /// Active tuning values
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Score so far in the current run
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Whether an ascending ship has been blocked at the midline
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Score to hand to the leaderboard, once the run is over
    pub fn final_score(&self) -> Option<u64> {
        self.game_over.then_some(self.score)
    }

    /// Highest tier spawned or merged since the last reset
    pub fn max_tier(&self) -> u32 {
        self.max_tier
    }

    /// Current spatial grid cell edge
    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// Spatial grid over the zone
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Where freshly armed ships appear
    pub fn launch_position(&self) -> Vec2 {
        self.launch_position
    }

    /// Visible ships in registry order
    pub fn ships(&self) -> Vec<ShipSnapshot> {
        self.ships
            .iter()
            .filter(|s| s.visible)
            .map(Ship::snapshot)
            .collect()
    }

    /// Look up any ship by id, visible or not
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.index_of(id).map(|i| &self.ships[i])
    }

    pub fn is_ready_to_launch(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_ship(&self) -> Option<ShipSnapshot> {
        self.armed.and_then(|id| self.ship(id)).map(Ship::snapshot)
    }

    /// Whether clamping against the zone bounds also stops the ship
    pub fn sticky_mode(&self) -> bool {
        self.settings.sticky_mode
    }

    /// Toggle sticky clamping; takes effect on the next tick
    pub fn set_sticky_mode(&mut self, sticky: bool) {
        self.settings.sticky_mode = sticky;
    }

    // === Registry ===

    pub(crate) fn index_of(&self, id: ShipId) -> Option<usize> {
        self.ships.binary_search_by_key(&id, |s| s.id).ok()
    }

    fn allocate_id(&mut self) -> ShipId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Cell size that fits a ship of `tier`, if the tier has a footprint
    fn cell_size_for(&self, tier: u32) -> Option<f32> {
        self.footprints
            .footprint(tier)
            .map(|size| self.settings.grid_margin + size.max_element())
    }

    /// Record a new maximum tier and grow the grid to fit it
    pub(crate) fn raise_max_tier(&mut self, tier: u32) {
        if tier <= self.max_tier {
            return;
        }
        self.max_tier = tier;
        let current = self.grid.cell_size();
        let size = self.cell_size_for(tier).unwrap_or(current).max(current);
        self.grid.rebuild(size);
        log::info!(
            "New max tier {}: grid rebuilt to {}x{} cells of {}",
            tier,
            self.grid.cols(),
            self.grid.rows(),
            size
        );
    }

    fn footprint_or_warn(&self, tier: u32) -> Option<Vec2> {
        let size = self.footprints.footprint(tier);
        if size.is_none() {
            log::warn!("No footprint registered for tier {}", tier);
        }
        size
    }

    /// Put a ship at the launch slot and arm it
    ///
    /// No-op if a ship is already armed. Returns the new id, or `None` when
    /// nothing was spawned (already armed, or the tier has no footprint).
    pub fn arm_next_ship(&mut self, tier: u32) -> Option<ShipId> {
        if self.armed.is_some() {
            return None;
        }
        let size = self.footprint_or_warn(tier)?;
        // Grid must already fit the new ship before it is registered
        self.raise_max_tier(tier);

        let id = self.allocate_id();
        self.ships.push(Ship::new(id, self.launch_position, size, tier));
        self.armed = Some(id);

        debug_assert_eq!(self.ships.iter().filter(|s| !s.launched).count(), 1);
        Some(id)
    }

    /// Place a launched ship directly on the board (scenario setup)
    ///
    /// A ship placed fully inside the zone is marked in-zone and registered
    /// in the grid immediately.
    pub fn place_ship(&mut self, tier: u32, pos: Vec2, vel: Vec2) -> Option<ShipId> {
        let size = self.footprint_or_warn(tier)?;
        self.raise_max_tier(tier);

        let id = self.allocate_id();
        let mut ship = Ship::new(id, pos, size, tier);
        ship.vel = vel;
        ship.launched = true;
        let rect = ship.rect();
        ship.in_zone = rect.top >= self.board.top_bar && rect.bottom <= self.board.midline();
        self.insert_ship(ship);
        Some(id)
    }

    /// Append a ship to the registry, registering in-zone ships in the grid
    pub(crate) fn insert_ship(&mut self, mut ship: Ship) {
        debug_assert!(self.ships.last().is_none_or(|last| last.id < ship.id));
        if ship.in_zone {
            let coords = self.grid.cells_overlapping(&ship.rect());
            for &coord in &coords {
                self.grid.insert(ship.id, coord);
            }
            ship.member_cells = coords;
        }
        self.ships.push(ship);
    }

    /// Fuse two same-tier ships into one of the next tier
    ///
    /// The product sits at the midpoint with the averaged velocity. Both
    /// inputs are marked invisible; the registry itself is not touched, the
    /// caller inserts the product and removes the inputs.
    pub fn merge_into(&mut self, a: ShipId, b: ShipId) -> Option<Ship> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        let (first, second) = (&self.ships[ia], &self.ships[ib]);
        if first.tier != second.tier {
            return None;
        }
        let tier = first.tier + 1;
        let pos = (first.pos + second.pos) / 2.0;
        let vel = (first.vel + second.vel) / 2.0;
        let size = self.footprint_or_warn(tier)?;

        self.ships[ia].visible = false;
        self.ships[ib].visible = false;

        let mut merged = Ship::new(self.allocate_id(), pos, size, tier);
        merged.vel = vel;
        merged.launched = true;
        merged.in_zone = true;
        log::debug!("Merged ships {} + {} into {} (tier {})", a, b, merged.id, tier);
        Some(merged)
    }

    /// Drop a ship from the registry and from every grid cell it occupies
    pub fn remove_ship(&mut self, id: ShipId) -> Option<Ship> {
        let index = self.index_of(id)?;
        let ship = self.ships.remove(index);
        for &coord in &ship.member_cells {
            self.grid.remove(id, coord);
        }
        if self.armed == Some(id) {
            self.armed = None;
        }
        Some(ship)
    }

    // === Launch controller ===

    /// Move the armed ship horizontally by `dx`
    pub fn drag_armed_ship(&mut self, dx: f32) {
        if let Some(x) = self.armed_index().map(|i| self.ships[i].pos.x + dx) {
            self.set_armed_ship_x(x);
        }
    }

    /// Put the armed ship's center at `x`, keeping its footprint on the board
    pub fn set_armed_ship_x(&mut self, x: f32) {
        let width = self.board.width;
        if let Some(i) = self.armed_index() {
            let ship = &mut self.ships[i];
            let half = ship.size.x / 2.0;
            ship.pos.x = x.max(half).min(width - half);
        }
    }

    /// Fire the armed ship straight up and arm the next one
    pub fn launch(&mut self) {
        let Some(i) = self.armed_index() else {
            return;
        };
        let speed = self.settings.launch_speed;
        let ship = &mut self.ships[i];
        ship.launched = true;
        ship.vel = Vec2::new(0.0, -speed);
        log::debug!("Launched ship {} (tier {}) at x={}", ship.id, ship.tier, ship.pos.x);

        self.armed = None;
        let tier = self.tiers.next_tier(self.settings.spawn_tier_max);
        self.arm_next_ship(tier);
    }

    /// Re-arm after the armed ship was consumed (Idle is never a steady state)
    pub(crate) fn ensure_armed(&mut self) {
        if self.armed.is_none() {
            let tier = self.tiers.next_tier(self.settings.spawn_tier_max);
            self.arm_next_ship(tier);
        }
    }

    fn armed_index(&self) -> Option<usize> {
        self.armed.and_then(|id| self.index_of(id))
    }
}
