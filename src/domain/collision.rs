/// Collision resolver: reconciles a just-integrated actor with the tile grid.
///
/// ## Footprint
///
/// The sprite box is never larger than a tile, so it overlaps at most a 2x2
/// block of cells whose top-left cell is `floor(pos / tile_size)`. At the last
/// row/column the block shrinks to one cell; an actor left of `-border`,
/// above `-size`, or past the last row/column is not resolved at all.
///
/// ## Per cell (in this order)
///
///   1. Platform: minimum-translation push-out along the shallowest side,
///      ties broken left → top → right → bottom. A platform cell that also
///      holds a ladder is one-way: it only catches a non-climbing actor
///      falling onto it with penetration under `one_way_tolerance`.
///   2. Ladder: overlap within `ladder_window` of the cell centre allows
///      climbing; a climbing actor is locked to the ladder's centre line.
///   3. Pickup: player only, and only while pickups are enabled.
///
/// ## Post-pass
///
///   - lost ladder contact ⇒ climbing state `None`
///   - still climbing ⇒ `vx = 0`, `vy = ∓ climb_speed` (0 when idle),
///     `can_jump = true`
///
/// Every lookup goes through the range-checked grid, so this is total.

use super::entity::{Actor, ClimbingState, Team};
use super::grid::TileGrid;
use super::physics::Aabb;
use super::tile::Collectible;
use crate::config::SimConfig;

/// Side of a tile an actor was pushed out through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

/// An item the player picked up this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pickup {
    pub x: usize,
    pub y: usize,
    pub kind: Collectible,
    pub points: u32,
}

/// Block of grid cells an actor may overlap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Footprint {
    pub x: usize,
    pub y: usize,
    pub cols: usize,
    pub rows: usize,
}

impl Footprint {
    /// Cells row by row, left to right.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.rows).flat_map(move |dy| (0..self.cols).map(move |dx| (self.x + dx, self.y + dy)))
    }
}

pub fn footprint(actor: &Actor, grid: &TileGrid, cfg: &SimConfig) -> Option<Footprint> {
    let pos = actor.pos;
    if pos.x < -cfg.actor.border || pos.y < -cfg.actor.size {
        return None;
    }
    // Slightly negative positions truncate to cell 0.
    let x = (pos.x / grid.tile_size()).max(0.0) as usize;
    let y = (pos.y / grid.tile_size()).max(0.0) as usize;
    if x >= grid.width() || y >= grid.height() {
        return None;
    }
    Some(Footprint {
        x,
        y,
        cols: if x == grid.width() - 1 { 1 } else { 2 },
        rows: if y == grid.height() - 1 { 1 } else { 2 },
    })
}

/// Shallowest way out of `cell` for `hitbox`.
/// Starts from a full tile so only a real penetration can win.
pub fn least_penetration(hitbox: &Aabb, cell: &Aabb) -> (Side, f32) {
    let candidates = [
        (Side::Left, hitbox.right() - cell.left()),
        (Side::Top, hitbox.bottom() - cell.top()),
        (Side::Right, cell.right() - hitbox.left()),
        (Side::Bottom, cell.bottom() - hitbox.top()),
    ];
    let mut best = (Side::Left, cell.w);
    for (side, depth) in candidates {
        if depth < best.1 {
            best = (side, depth);
        }
    }
    best
}

/// Resolve one actor against the grid. Returns the items picked up.
///
/// `pickups_enabled` is only consulted for `Team::Player`.
pub fn resolve(
    actor: &mut Actor,
    grid: &mut TileGrid,
    cfg: &SimConfig,
    pickups_enabled: bool,
) -> Vec<Pickup> {
    let mut pickups = Vec::new();

    if actor.dead {
        actor.can_climb = false;
        actor.climbing = ClimbingState::None;
        return pickups;
    }

    actor.can_climb = false;
    let collects = match actor.team {
        Team::Player => pickups_enabled,
        Team::Enemy => false,
    };

    if let Some(fp) = footprint(actor, grid, cfg) {
        for (x, y) in fp.cells() {
            resolve_platform(actor, grid, cfg, x, y);
            resolve_ladder(actor, grid, cfg, x, y);
            if collects {
                if let Some(p) = collect(actor, grid, cfg, x, y) {
                    pickups.push(p);
                }
            }
        }
    }

    if !actor.can_climb {
        actor.climbing = ClimbingState::None;
    }

    if actor.climbing.is_climbing() {
        actor.can_jump = true;
        actor.vel.x = 0.0;
        let speed = actor.climb_speed(cfg);
        actor.vel.y = match actor.climbing {
            ClimbingState::Ascending => -speed,
            ClimbingState::Descending => speed,
            _ => 0.0,
        };
    }

    pickups
}

fn resolve_platform(actor: &mut Actor, grid: &TileGrid, cfg: &SimConfig, x: usize, y: usize) {
    if grid.platform_at(x, y).is_blank() { return; }

    let cell = grid.cell_rect(x, y);
    let hitbox = actor.hitbox(&cfg.actor);
    if !hitbox.overlaps(&cell) { return; }

    if grid.extra_at(x, y).is_ladder() {
        // One-way: only catch a grazing fall onto the top.
        let depth = hitbox.bottom() - cell.top();
        if !actor.climbing.is_climbing() && actor.vel.y > 0.0 && depth < cfg.actor.one_way_tolerance {
            actor.pos.y = cell.top() - cfg.actor.size;
            actor.vel.y = 0.0;
            actor.can_jump = true;
        }
        return;
    }

    let (side, depth) = least_penetration(&hitbox, &cell);
    match side {
        Side::Left => {
            actor.pos.x -= depth;
            actor.vel.x = 0.0;
        }
        Side::Top => {
            actor.pos.y -= depth;
            actor.vel.y = 0.0;
            actor.can_jump = true;
            actor.climbing = ClimbingState::None;
        }
        Side::Right => {
            actor.pos.x += depth;
            actor.vel.x = 0.0;
        }
        Side::Bottom => {
            actor.pos.y += depth;
            actor.vel.y = 0.0;
        }
    }
}

fn resolve_ladder(actor: &mut Actor, grid: &TileGrid, cfg: &SimConfig, x: usize, y: usize) {
    if !grid.extra_at(x, y).is_ladder() { return; }

    let cell = grid.cell_rect(x, y);
    if !actor.hitbox(&cfg.actor).overlaps(&cell) { return; }

    let offset = cell.center_x() - actor.center(&cfg.actor).x;
    if offset.abs() < cfg.actor.ladder_window {
        actor.can_climb = true;
        if actor.climbing.is_climbing() {
            actor.pos.x = cell.center_x() - cfg.actor.size / 2.0;
        }
    }
}

fn collect(actor: &Actor, grid: &mut TileGrid, cfg: &SimConfig, x: usize, y: usize) -> Option<Pickup> {
    let kind = grid.extra_at(x, y).collectible()?;

    // Items are drawn smaller than a tile; so is their pickup box.
    let cell = grid.cell_rect(x, y);
    let border = cfg.score.collectible_border;
    let size = cfg.score.collectible_size;
    let item = Aabb::new(cell.x + border, cell.y + border, size, size);
    if !actor.hitbox(&cfg.actor).overlaps(&item) { return None; }

    grid.take_extra(x, y);
    Some(Pickup { x, y, kind, points: kind.points(&cfg.score) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testutil::grid_from;
    use crate::domain::tile::TileId;
    use glam::Vec2;
    use pretty_assertions::assert_eq;

    fn actor_at(team: Team, x: f32, y: f32) -> Actor {
        Actor::new(team, Vec2::new(x, y))
    }

    // ── Footprint ──

    #[test]
    fn footprint_is_two_by_two_inside() {
        let g = grid_from(&["    ", "    ", "    "]);
        let a = actor_at(Team::Player, 3.0, 9.0);
        let fp = footprint(&a, &g, &SimConfig::default()).unwrap();
        assert_eq!(fp, Footprint { x: 0, y: 1, cols: 2, rows: 2 });
        assert_eq!(fp.cells().collect::<Vec<_>>(), vec![(0, 1), (1, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn footprint_shrinks_at_last_row_and_column() {
        let g = grid_from(&["    ", "    ", "    "]);
        let a = actor_at(Team::Player, 25.0, 17.0);
        let fp = footprint(&a, &g, &SimConfig::default()).unwrap();
        assert_eq!((fp.cols, fp.rows), (1, 1));
    }

    #[test]
    fn footprint_skipped_far_outside() {
        let g = grid_from(&["    ", "    "]);
        let cfg = SimConfig::default();
        assert!(footprint(&actor_at(Team::Player, -3.0, 0.0), &g, &cfg).is_none());
        assert!(footprint(&actor_at(Team::Player, 0.0, -9.0), &g, &cfg).is_none());
        assert!(footprint(&actor_at(Team::Player, 0.0, 16.0), &g, &cfg).is_none());
        assert!(footprint(&actor_at(Team::Player, 32.0, 0.0), &g, &cfg).is_none());
        // slightly negative still resolves against the first cells
        assert_eq!(footprint(&actor_at(Team::Player, -1.5, -4.0), &g, &cfg).map(|f| (f.x, f.y)), Some((0, 0)));
    }

    // ── Least penetration ──

    #[test]
    fn least_penetration_prefers_left_on_tie() {
        let cell = Aabb::new(8.0, 8.0, 8.0, 8.0);
        // left = 1, top = 1
        let hit = Aabb::new(5.0, 1.0, 4.0, 8.0);
        assert_eq!(least_penetration(&hit, &cell), (Side::Left, 1.0));
        // top = 1, right = 1: top wins
        let hit = Aabb::new(15.0, 1.0, 4.0, 8.0);
        assert_eq!(least_penetration(&hit, &cell), (Side::Top, 1.0));
        // right = 2, bottom = 2: right wins
        let hit = Aabb::new(14.0, 14.0, 4.0, 8.0);
        assert_eq!(least_penetration(&hit, &cell), (Side::Right, 2.0));
    }

    // ── Platforms ──

    #[test]
    fn landing_on_top() {
        let mut g = grid_from(&["    ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 4.0, 1.5);
        a.vel = Vec2::new(0.0, 60.0);
        a.climbing = ClimbingState::Idle;
        a.can_climb = false;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.y, 0.0);
        assert_eq!(a.vel.y, 0.0);
        assert!(a.can_jump);
        assert_eq!(a.climbing, ClimbingState::None);
    }

    #[test]
    fn wall_on_the_right_pushes_left() {
        let mut g = grid_from(&["  # ", "####"]);
        let cfg = SimConfig::default();
        // hitbox [11, 15) vs wall [16, 24): no overlap yet
        let mut a = actor_at(Team::Player, 9.0, 0.0);
        a.vel.x = 50.0;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.x, 9.0);
        assert_eq!(a.vel.x, 50.0);

        // hitbox [13, 17): one pixel into the wall
        a.pos.x = 11.0;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.x, 10.0);
        assert_eq!(a.vel.x, 0.0);
    }

    #[test]
    fn wall_on_the_left_pushes_right() {
        let mut g = grid_from(&["#   ", "####"]);
        let cfg = SimConfig::default();
        // hitbox [7, 11): one pixel into [0, 8)
        let mut a = actor_at(Team::Player, 5.0, 0.0);
        a.vel.x = -50.0;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.x, 6.0);
        assert_eq!(a.vel.x, 0.0);
    }

    #[test]
    fn head_bump_from_below() {
        let mut g = grid_from(&["####", "    ", "    "]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 4.0, 7.0);
        a.vel.y = -80.0;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.y, 8.0);
        assert_eq!(a.vel.y, 0.0);
        assert!(!a.can_jump);
    }

    #[test]
    fn clear_of_platforms_is_untouched() {
        let mut g = grid_from(&["#  #", "    ", "####"]);
        let cfg = SimConfig::default();
        // hitbox [10, 14) x [4, 12): touches nothing
        let mut a = actor_at(Team::Enemy, 8.0, 4.0);
        a.vel = Vec2::new(-13.0, 42.0);
        resolve(&mut a, &mut g, &cfg, false);
        assert_eq!(a.pos, Vec2::new(8.0, 4.0));
        assert_eq!(a.vel, Vec2::new(-13.0, 42.0));
        assert!(!a.can_jump);
    }

    // ── One-way ladder platforms ──

    #[test]
    fn ladder_top_catches_a_grazing_fall() {
        let mut g = grid_from(&["    ", " %  ", " H  "]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 8.0, 1.0);
        a.vel.y = 30.0;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.y, 0.0);
        assert_eq!(a.vel.y, 0.0);
        assert!(a.can_jump);
    }

    #[test]
    fn ladder_top_lets_deep_or_rising_actors_through() {
        let mut g = grid_from(&["    ", " %  ", " H  "]);
        let cfg = SimConfig::default();

        let mut deep = actor_at(Team::Player, 8.0, 3.0);
        deep.vel.y = 30.0;
        resolve(&mut deep, &mut g, &cfg, true);
        assert_eq!(deep.pos.y, 3.0);

        let mut rising = actor_at(Team::Player, 8.0, 1.0);
        rising.vel.y = -30.0;
        resolve(&mut rising, &mut g, &cfg, true);
        assert_eq!(rising.pos.y, 1.0);
    }

    #[test]
    fn ladder_top_lets_climbers_through() {
        let mut g = grid_from(&[" H  ", " %  ", " H  "]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 8.0, 1.0);
        a.climbing = ClimbingState::Descending;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.y, 1.0);
        assert_eq!(a.climbing, ClimbingState::Descending);
        assert_eq!(a.vel.y, cfg.player.climb_speed);
    }

    // ── Ladders ──

    #[test]
    fn near_ladder_centre_allows_climbing() {
        let mut g = grid_from(&[" H  ", " H  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 9.5, 8.0);
        resolve(&mut a, &mut g, &cfg, true);
        assert!(a.can_climb);
        assert_eq!(a.climbing, ClimbingState::None);
        assert_eq!(a.pos.x, 9.5);
    }

    #[test]
    fn far_from_ladder_centre_cannot_climb() {
        let mut g = grid_from(&[" H  ", " H  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 10.0, 8.0);
        a.climbing = ClimbingState::Ascending;
        resolve(&mut a, &mut g, &cfg, true);
        assert!(!a.can_climb);
        assert_eq!(a.climbing, ClimbingState::None);
    }

    #[test]
    fn climbing_locks_to_ladder_and_sets_speed() {
        let mut g = grid_from(&[" H  ", " H  ", " H  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Enemy, 6.5, 6.0);
        a.vel = Vec2::new(15.0, 0.0);
        a.climbing = ClimbingState::Ascending;
        resolve(&mut a, &mut g, &cfg, false);
        assert_eq!(a.pos.x, 8.0);
        assert_eq!(a.vel, Vec2::new(0.0, -cfg.enemy.climb_speed));
        assert!(a.can_jump);

        a.climbing = ClimbingState::Idle;
        resolve(&mut a, &mut g, &cfg, false);
        assert_eq!(a.vel, Vec2::ZERO);
    }

    // ── Pickups ──

    #[test]
    fn player_collects_coin_once() {
        let mut g = grid_from(&[" $  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 6.0, 0.0);
        let got = resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(got, vec![Pickup { x: 1, y: 0, kind: Collectible::Coin, points: cfg.score.coin }]);
        assert!(g.extra_at(1, 0).is_blank());
        assert!(resolve(&mut a, &mut g, &cfg, true).is_empty());
    }

    #[test]
    fn gem_scores_gem_points() {
        let mut g = grid_from(&[" *  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 8.0, 0.0);
        let got = resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].points, cfg.score.gem);
    }

    #[test]
    fn pickup_box_is_smaller_than_the_tile() {
        let mut g = grid_from(&[" $  ", "####"]);
        let cfg = SimConfig::default();
        // hitbox [6, 10) overlaps the cell [8, 16) but not the item box [10, 14)
        let mut a = actor_at(Team::Player, 4.0, 0.0);
        assert!(resolve(&mut a, &mut g, &cfg, true).is_empty());
        assert_eq!(g.extra_at(1, 0), TileId::COIN);
    }

    #[test]
    fn enemies_and_disabled_pickups_leave_items() {
        let mut g = grid_from(&[" $  ", "####"]);
        let cfg = SimConfig::default();
        let mut enemy = actor_at(Team::Enemy, 8.0, 0.0);
        assert!(resolve(&mut enemy, &mut g, &cfg, true).is_empty());
        let mut player = actor_at(Team::Player, 8.0, 0.0);
        assert!(resolve(&mut player, &mut g, &cfg, false).is_empty());
        assert_eq!(g.coins_left(), 1);
    }

    // ── Dead actors ──

    #[test]
    fn dead_actor_falls_through() {
        let mut g = grid_from(&[" H  ", "####"]);
        let cfg = SimConfig::default();
        let mut a = actor_at(Team::Player, 8.0, 4.0);
        a.dead = true;
        a.vel.y = 50.0;
        a.climbing = ClimbingState::Idle;
        resolve(&mut a, &mut g, &cfg, true);
        assert_eq!(a.pos.y, 4.0);
        assert_eq!(a.vel.y, 50.0);
        assert!(!a.can_climb);
        assert_eq!(a.climbing, ClimbingState::None);
    }
}
