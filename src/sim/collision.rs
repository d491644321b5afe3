//! Collision detection and response between ships
//!
//! Broad-phase through the spatial grid, exact AABB test, then either a
//! merge (same tier) or a reflective bounce (different tiers, inside the
//! zone). Registry changes are collected and applied after the scan.

use std::collections::HashSet;

use glam::Vec2;

use super::state::{Engine, Ship, ShipId};
use crate::consts::MIN_NORMAL_LENGTH;
use crate::reflect;

/// Outcome of a bounce between two ships
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceResult {
    /// Unit normal pointing from `b` towards `a`
    pub normal: Vec2,
    pub vel_a: Vec2,
    pub vel_b: Vec2,
}

/// Reflect both velocities across the line joining the centers
///
/// A ship at rest takes `inert_rebound` of the other's velocity, negated,
/// as its incoming velocity before reflecting.
pub fn bounce_velocities(
    pos_a: Vec2,
    vel_a: Vec2,
    pos_b: Vec2,
    vel_b: Vec2,
    inert_rebound: f32,
) -> BounceResult {
    let diff = pos_a - pos_b;
    let normal = diff / diff.length().max(MIN_NORMAL_LENGTH);

    let incoming_a = if vel_a == Vec2::ZERO {
        -vel_b * inert_rebound
    } else {
        vel_a
    };
    let incoming_b = if vel_b == Vec2::ZERO {
        -vel_a * inert_rebound
    } else {
        vel_b
    };

    BounceResult {
        normal,
        vel_a: reflect(incoming_a, normal),
        vel_b: reflect(incoming_b, normal),
    }
}

/// Unordered pair key
#[inline]
fn pair_key(a: ShipId, b: ShipId) -> (ShipId, ShipId) {
    if a < b { (a, b) } else { (b, a) }
}

/// One collision pass over every visible ship in registry order
pub(crate) fn resolve_collisions(engine: &mut Engine) {
    let midline = engine.board.midline();
    let mut seen: HashSet<(ShipId, ShipId)> = HashSet::new();
    let mut to_remove: Vec<ShipId> = Vec::new();
    let mut to_add: Vec<Ship> = Vec::new();

    for i in 0..engine.ships.len() {
        if !engine.ships[i].visible {
            continue;
        }
        let id = engine.ships[i].id;
        let coords = engine.grid.cells_overlapping(&engine.ships[i].rect());
        let candidates = engine.grid.ships_in(&coords);

        for other_id in candidates {
            if other_id == id {
                continue;
            }
            let Some(j) = engine.index_of(other_id) else {
                continue;
            };
            if !engine.ships[j].visible {
                continue;
            }
            if !seen.insert(pair_key(id, other_id)) {
                continue;
            }

            let rect = engine.ships[i].rect();
            if !rect.intersects(&engine.ships[j].rect()) {
                continue;
            }

            if engine.ships[i].tier == engine.ships[j].tier {
                if let Some(merged) = merge_pair(engine, id, other_id) {
                    to_remove.extend([id, other_id]);
                    to_add.push(merged);
                    // This ship is consumed
                    break;
                }
            } else if rect.bottom <= midline {
                bounce_pair(engine, i, j);
            }
        }
    }

    for id in to_remove {
        engine.remove_ship(id);
    }
    for ship in to_add {
        engine.insert_ship(ship);
    }
}

/// Merge two same-tier ships, scoring and growing the grid as needed
fn merge_pair(engine: &mut Engine, a: ShipId, b: ShipId) -> Option<Ship> {
    let merged = engine.merge_into(a, b)?;
    engine.score += engine.settings.merge_score(merged.tier);
    engine.raise_max_tier(merged.tier);
    Some(merged)
}

fn bounce_pair(engine: &mut Engine, i: usize, j: usize) {
    let (a, b) = (&engine.ships[i], &engine.ships[j]);
    let result = bounce_velocities(a.pos, a.vel, b.pos, b.vel, engine.settings.inert_rebound);
    let nudge = result.normal * engine.settings.bounce_offset;

    let a = &mut engine.ships[i];
    a.vel = result.vel_a;
    a.pos += nudge;

    let b = &mut engine.ships[j];
    b.vel = result.vel_b;
    b.pos -= nudge;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::engine_with;
    use proptest::prelude::*;

    #[test]
    fn test_same_tier_merge() {
        let mut engine = engine_with(0);
        let armed = engine.armed_ship().unwrap().id;
        let a = engine.place_ship(2, Vec2::new(400.0, 500.0), Vec2::ZERO).unwrap();
        let b = engine.place_ship(2, Vec2::new(450.0, 520.0), Vec2::ZERO).unwrap();
        let score = engine.score();

        engine.tick();

        let ships = engine.ships();
        assert!(ships.iter().all(|s| s.id != a && s.id != b));
        let merged: Vec<_> = ships.iter().filter(|s| s.id != armed).collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].tier, 3);
        assert_eq!(merged[0].rect.center(), Vec2::new(425.0, 510.0));
        assert!(merged[0].in_zone);
        assert_eq!(engine.score(), score + 500 + 100 * 4);
        assert_eq!(engine.max_tier(), 3);
    }

    #[test]
    fn test_merged_ship_registered_in_grid() {
        let mut engine = engine_with(0);
        engine.place_ship(1, Vec2::new(400.0, 500.0), Vec2::ZERO);
        engine.place_ship(1, Vec2::new(430.0, 500.0), Vec2::ZERO);
        engine.tick();

        let merged = engine.ships.last().unwrap();
        assert_eq!(merged.tier, 2);
        assert!(!merged.member_cells.is_empty());
        for coord in &merged.member_cells {
            assert!(engine.grid.cell(*coord).unwrap().ships.contains(&merged.id));
        }
    }

    #[test]
    fn test_resting_ship_reregisters_after_rebuild() {
        let mut engine = engine_with(0);
        let resting = engine.place_ship(1, Vec2::new(150.0, 500.0), Vec2::ZERO).unwrap();
        engine.place_ship(2, Vec2::new(600.0, 500.0), Vec2::ZERO);
        engine.place_ship(2, Vec2::new(640.0, 500.0), Vec2::ZERO);
        let registered = |engine: &Engine| {
            let rect = engine.ship(resting).unwrap().rect();
            let coords = engine.grid.cells_overlapping(&rect);
            engine.grid.ships_in(&coords).contains(&resting)
        };
        assert!(registered(&engine));

        // The tier 3 merge grows the grid and drops every membership
        let cell_size = engine.cell_size();
        engine.tick();
        assert_eq!(engine.max_tier(), 3);
        assert!(engine.cell_size() > cell_size);
        assert!(!registered(&engine));

        engine.tick();
        assert!(registered(&engine));
        let ship = engine.ship(resting).unwrap();
        assert_eq!(ship.vel, Vec2::ZERO);
        assert_eq!(ship.member_cells, engine.grid.cells_overlapping(&ship.rect()));
    }

    #[test]
    fn test_merge_consumes_each_ship_once() {
        let mut engine = engine_with(0);
        // Three overlapping tier-1 ships: only one pair can merge
        engine.place_ship(1, Vec2::new(400.0, 500.0), Vec2::ZERO);
        engine.place_ship(1, Vec2::new(430.0, 500.0), Vec2::ZERO);
        engine.place_ship(1, Vec2::new(460.0, 500.0), Vec2::ZERO);
        engine.tick();

        let mut tiers: Vec<u32> = engine.ships().iter().filter(|s| s.launched).map(|s| s.tier).collect();
        tiers.sort();
        assert_eq!(tiers, vec![1, 2]);
        assert_eq!(engine.score(), 500 + 100 * 3);
    }

    #[test]
    fn test_merge_missing_footprint_leaves_ships() {
        let mut engine = engine_with(0);
        // engine_with registers tiers 0..8
        let a = engine.place_ship(7, Vec2::new(400.0, 500.0), Vec2::ZERO).unwrap();
        let b = engine.place_ship(7, Vec2::new(420.0, 500.0), Vec2::ZERO).unwrap();
        engine.tick();

        assert!(engine.ship(a).unwrap().visible);
        assert!(engine.ship(b).unwrap().visible);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.max_tier(), 7);
    }

    #[test]
    fn test_different_tiers_bounce() {
        let mut engine = engine_with(0);
        let a = engine.place_ship(1, Vec2::new(400.0, 500.0), Vec2::new(6.0, 0.0)).unwrap();
        let b = engine.place_ship(2, Vec2::new(500.0, 500.0), Vec2::new(-4.0, 0.0)).unwrap();
        engine.tick();

        let (sa, sb) = (engine.ship(a).unwrap(), engine.ship(b).unwrap());
        assert_eq!(sa.tier, 1);
        assert_eq!(sb.tier, 2);
        // Moved then damped, then reflected along the x axis
        assert!((sa.vel.x - (-6.0 * 0.97)).abs() < 1e-4);
        assert!((sb.vel.x - (4.0 * 0.97)).abs() < 1e-4);
        // Pushed apart by the bounce offset
        assert!((sa.pos.x - (406.0 - 5.0)).abs() < 1e-3);
        assert!((sb.pos.x - (496.0 + 5.0)).abs() < 1e-3);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_no_bounce_while_straddling_midline() {
        let mut engine = engine_with(0);
        let a = engine.place_ship(1, Vec2::new(400.0, 950.0), Vec2::new(0.0, 3.0)).unwrap();
        // Still sticking out below the midline, so not registered in the grid
        let b = engine.place_ship(2, Vec2::new(420.0, 1040.0), Vec2::new(0.0, -3.0)).unwrap();
        assert!(!engine.ship(b).unwrap().in_zone);

        resolve_collisions(&mut engine);
        assert_eq!(engine.ship(a).unwrap().vel, Vec2::new(0.0, 3.0));
        assert_eq!(engine.ship(b).unwrap().vel, Vec2::new(0.0, -3.0));
    }

    #[test]
    fn test_inert_ship_substitution() {
        let result = bounce_velocities(
            Vec2::new(10.0, 0.0),
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(5.0, 0.0),
            0.8,
        );
        assert_eq!(result.normal, Vec2::X);
        // a takes -0.8 * (5, 0) = (-4, 0), reflected to (4, 0)
        assert!((result.vel_a - Vec2::new(4.0, 0.0)).length() < 1e-5);
        assert!((result.vel_b - Vec2::new(-5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_coincident_centers_do_not_blow_up() {
        let result = bounce_velocities(
            Vec2::new(3.0, 3.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(0.0, 1.0),
            0.8,
        );
        assert_eq!(result.normal, Vec2::ZERO);
        assert_eq!(result.vel_a, Vec2::new(1.0, 0.0));
        assert!(result.vel_b.is_finite());
    }

    proptest! {
        #[test]
        fn prop_bounce_negates_normal_component(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            vax in -40.0f32..40.0, vay in -40.0f32..40.0,
            vbx in -40.0f32..40.0, vby in -40.0f32..40.0,
        ) {
            let (pa, pb) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            prop_assume!((pa - pb).length() > 1.0);
            let (va, vb) = (Vec2::new(vax, vay), Vec2::new(vbx, vby));
            prop_assume!(va != Vec2::ZERO && vb != Vec2::ZERO);

            let r = bounce_velocities(pa, va, pb, vb, 0.8);
            prop_assert!((r.vel_a.dot(r.normal) + va.dot(r.normal)).abs() < 1e-2);
            prop_assert!((r.vel_b.dot(r.normal) + vb.dot(r.normal)).abs() < 1e-2);
            // Tangential part is preserved, so speed is too
            prop_assert!((r.vel_a.length() - va.length()).abs() < 1e-2);
        }

        #[test]
        fn prop_cell_size_never_shrinks(tiers in proptest::collection::vec(0u32..8, 1..20)) {
            let mut engine = engine_with(0);
            let mut last = engine.cell_size();
            for tier in tiers {
                engine.place_ship(tier, Vec2::new(500.0, 500.0), Vec2::ZERO);
                engine.tick();
                prop_assert!(engine.cell_size() >= last);
                last = engine.cell_size();
            }
        }
    }
}
