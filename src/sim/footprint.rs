//! Tier to footprint geometry
//!
//! The engine never decides how a tier looks; it asks a `FootprintLookup`
//! for the width/height of a tier's art and sizes ships from that.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::{SHIP_BASE_FRACTION, SHIP_TIER_SCALE};

/// Maps a tier to its pixel footprint (width, height)
pub trait FootprintLookup {
    /// `None` means the tier has no art registered (a configuration fault)
    fn footprint(&self, tier: u32) -> Option<Vec2>;
}

impl<F> FootprintLookup for F
where
    F: Fn(u32) -> Option<Vec2>,
{
    fn footprint(&self, tier: u32) -> Option<Vec2> {
        self(tier)
    }
}

/// Aspect-ratio-correct scaling by tier
///
/// Edge length for tier `t` is `base * 1.25^(t-1)`; the longer side of the
/// art is matched to it and the shorter side scaled by the aspect ratio.
#[derive(Debug, Clone)]
pub struct ScaledFootprints {
    base_size: f32,
    /// width / height of each tier's art
    aspect_ratios: BTreeMap<u32, f32>,
}

impl ScaledFootprints {
    /// Base edge derived from board width
    pub fn for_board(board_width: f32) -> Self {
        Self {
            base_size: board_width * SHIP_BASE_FRACTION,
            aspect_ratios: BTreeMap::new(),
        }
    }

    /// Square art for tiers `0..tiers`
    pub fn uniform(board_width: f32, tiers: u32) -> Self {
        let mut lookup = Self::for_board(board_width);
        for tier in 0..tiers {
            lookup.register(tier, 1.0);
        }
        lookup
    }

    /// Register art for a tier by its width/height ratio
    pub fn register(&mut self, tier: u32, aspect_ratio: f32) -> &mut Self {
        self.aspect_ratios.insert(tier, aspect_ratio);
        self
    }

    /// Target edge length for a tier
    pub fn edge_for_tier(&self, tier: u32) -> f32 {
        self.base_size * SHIP_TIER_SCALE.powi(tier as i32 - 1)
    }
}

impl FootprintLookup for ScaledFootprints {
    fn footprint(&self, tier: u32) -> Option<Vec2> {
        let aspect = *self.aspect_ratios.get(&tier)?;
        if aspect <= 0.0 {
            return None;
        }
        let edge = self.edge_for_tier(tier);
        Some(if aspect >= 1.0 {
            // Wider than tall
            Vec2::new(edge, edge / aspect)
        } else {
            Vec2::new(edge * aspect, edge)
        })
    }
}
