/// Actor kinematics: gravity, integration, screen-edge clamping.
///
/// ## Frame order (shared by every actor)
///
///   1. `can_jump` cleared (landing or ladder contact sets it again)
///   2. gravity, unless the actor is on a ladder
///   3. position += velocity * dt
///   4. horizontal clamp: the hitbox never leaves `[0, grid pixel width]`
///   5. facing from the sign of `vx` (unchanged when `vx == 0`)
///
/// `dt` is expected to be clamped by the caller; nothing here assumes a
/// maximum, but collision resolution relies on sub-tile penetration.

use super::entity::{Actor, Facing};
use super::grid::TileGrid;
use crate::config::SimConfig;

/// Axis-aligned box, top-left anchored, in pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Aabb { x, y, w, h }
    }

    #[inline] pub fn left(&self) -> f32 { self.x }
    #[inline] pub fn top(&self) -> f32 { self.y }
    #[inline] pub fn right(&self) -> f32 { self.x + self.w }
    #[inline] pub fn bottom(&self) -> f32 { self.y + self.h }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
}

/// Advance one actor by `dt` seconds (steps 1–5 above).
pub fn integrate(actor: &mut Actor, dt: f32, grid: &TileGrid, cfg: &SimConfig) {
    actor.can_jump = false;

    if !actor.climbing.is_climbing() {
        actor.vel.y += cfg.world.gravity * dt;
    }

    actor.pos += actor.vel * dt;

    let min_x = -cfg.actor.border;
    let max_x = grid.pixel_width() - cfg.actor.border - cfg.actor.hitbox_width();
    actor.pos.x = actor.pos.x.clamp(min_x, max_x);

    update_facing(actor);
}

/// Facing follows horizontal velocity; standing still keeps the last facing.
pub fn update_facing(actor: &mut Actor) {
    if actor.vel.x < 0.0 {
        actor.facing = Facing::Left;
    } else if actor.vel.x > 0.0 {
        actor.facing = Facing::Right;
    }
}
