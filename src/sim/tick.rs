//! Fixed step simulation tick
//!
//! One tick moves every launched ship, validates zone entry (which may end
//! the run), then resolves collisions.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::rect::Rect;
use super::state::Engine;
use crate::consts::MIN_SPEED;

/// Advance the simulation by one fixed step
///
/// No-op once the game is over, until `reset`.
pub fn tick(engine: &mut Engine) {
    if engine.game_over {
        return;
    }
    move_ships(engine);
    if engine.game_over {
        return;
    }
    resolve_collisions(engine);
    engine.ensure_armed();
}

/// Whether a ship with `rect` and `tier` may keep entering the zone
///
/// Fails only when the candidate still sticks out below the midline
/// while overlapping a visible ship of another tier. A candidate
/// entirely below the midline never fails.
pub fn can_enter_zone(engine: &Engine, rect: &Rect, tier: u32) -> bool {
    let midline = engine.board.midline();
    let coords = engine.grid.cells_overlapping(rect);
    for id in engine.grid.ships_in(&coords) {
        let Some(other) = engine.ship(id) else {
            continue;
        };
        if !other.visible || other.tier == tier {
            continue;
        }
        if other.rect().intersects(rect) && rect.bottom > midline {
            return false;
        }
    }
    true
}

impl Engine {
    /// Advance the simulation by one fixed step
    pub fn tick(&mut self) {
        tick(self);
    }

    /// See [`can_enter_zone`]
    pub fn can_enter_zone(&self, rect: &Rect, tier: u32) -> bool {
        can_enter_zone(self, rect, tier)
    }
}

/// Move launched ships in registry order, stopping as soon as the run ends
fn move_ships(engine: &mut Engine) {
    for i in 0..engine.ships.len() {
        if !engine.ships[i].launched {
            continue;
        }
        move_ship(engine, i);
        if engine.game_over {
            log::info!("Game over: final score {}", engine.score);
            return;
        }
    }
}

fn move_ship(engine: &mut Engine, i: usize) {
    let board = engine.board;
    let midline = board.midline();

    if engine.ships[i].vel.length() > MIN_SPEED {
        let ship = &mut engine.ships[i];
        ship.pos += ship.vel;
        let rect = ship.rect();

        // Side walls
        if rect.left < 0.0 || rect.right > board.width {
            ship.vel.x = -ship.vel.x;
        }

        if !ship.in_zone && rect.top < midline {
            let tier = ship.tier;
            if !can_enter_zone(engine, &rect, tier) {
                engine.game_over = true;
                return;
            }
            if rect.bottom <= midline {
                engine.ships[i].in_zone = true;
                engine.score += engine.settings.entry_bonus(tier);
                log::debug!("Ship {} entered the zone", engine.ships[i].id);
            }
        }

        let ship = &mut engine.ships[i];
        if ship.in_zone && (rect.top < board.top_bar || rect.bottom > midline) {
            ship.vel.y = -ship.vel.y;
        }
    } else {
        engine.ships[i].vel = Vec2::ZERO;
    }

    if engine.ships[i].in_zone {
        settle_in_zone(engine, i);
    }
}

/// Damping, grid membership refresh and clamping for an in-zone ship
fn settle_in_zone(engine: &mut Engine, i: usize) {
    let board = engine.board;
    let damping = engine.settings.damping;
    let sticky = engine.settings.sticky_mode;

    let ship = &mut engine.ships[i];
    ship.vel *= damping;

    let coords = engine.grid.cells_overlapping(&ship.rect());
    for &old in &ship.member_cells {
        if !coords.contains(&old) {
            engine.grid.remove(ship.id, old);
        }
    }
    for &coord in &coords {
        engine.grid.insert(ship.id, coord);
    }
    ship.member_cells = coords;

    let half = ship.size / 2.0;
    let min = Vec2::new(half.x, board.top_bar + half.y);
    let max = Vec2::new(board.width - half.x, board.midline() - half.y);

    if ship.pos.y < min.y {
        ship.pos.y = min.y;
        if sticky {
            ship.vel.y = 0.0;
        }
    }
    if ship.pos.y > max.y {
        ship.pos.y = max.y;
        if sticky {
            ship.vel.y = 0.0;
        }
    }
    if ship.pos.x < min.x {
        ship.pos.x = min.x;
        if sticky {
            ship.vel.x = 0.0;
        }
    }
    if ship.pos.x > max.x {
        ship.pos.x = max.x;
        if sticky {
            ship.vel.x = 0.0;
        }
    }
}
