/// Enemy AI: patrol and ladder decisions layered on the shared pipeline.
///
/// Two states:
///   1. **Patrolling**: walk at a fixed speed; turn around when the probe
///      one step ahead at foot level finds no platform. While not yet
///      flagged, re-roll "climb the next ladder" each frame. A flagged
///      enemy with a ladder in reach probes above and below its centre
///      and starts climbing.
///   2. **Climbing**: no decisions; the resolver moves the enemy along
///      the ladder. When its climbing state drops back to `None` (top or
///      bottom reached, or knocked off) the enemy patrols again.
///
/// Direction and speed are drawn once at spawn. Every random draw comes
/// from the caller's RNG, so a seeded RNG replays a level exactly.

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::entity::{Actor, ClimbingState, Team};
use super::grid::{Layer, TileGrid};
use super::physics;
use crate::config::SimConfig;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiState {
    Patrolling,
    Climbing,
}

/// A decision taken during one `update`, reported for presentation and logs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiDecision {
    Turned,
    StartedClimbing { ascending: bool },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub(crate) actor: Actor,
    direction: f32, // +1 right, -1 left
    speed: f32,
    state: AiState,
    climb_next_ladder: bool,
}

impl Enemy {
    pub fn spawn(pos: Vec2, cfg: &SimConfig, rng: &mut impl Rng) -> Self {
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = rng.random_range(cfg.enemy.min_speed..=cfg.enemy.max_speed);
        Enemy {
            actor: Actor::new(Team::Enemy, pos),
            direction,
            speed,
            state: AiState::Patrolling,
            climb_next_ladder: false,
        }
    }

    pub fn actor(&self) -> &Actor { &self.actor }
    pub fn direction(&self) -> f32 { self.direction }
    pub fn speed(&self) -> f32 { self.speed }
    pub fn state(&self) -> AiState { self.state }
    pub fn will_climb_next_ladder(&self) -> bool { self.climb_next_ladder }

    pub fn update(
        &mut self,
        dt: f32,
        grid: &mut TileGrid,
        cfg: &SimConfig,
        rng: &mut impl Rng,
    ) -> Vec<AiDecision> {
        let mut decisions = Vec::new();

        if self.state == AiState::Patrolling {
            if !self.platform_ahead(grid, cfg) {
                self.direction = -self.direction;
                decisions.push(AiDecision::Turned);
            }
            self.actor.vel.x = self.speed * self.direction;

            if !self.climb_next_ladder {
                self.climb_next_ladder = rng.random_bool(cfg.enemy.climb_next_ladder_chance);
            }
            if self.climb_next_ladder && self.actor.can_climb {
                if let Some(ascending) = self.choose_ladder(grid, cfg, rng) {
                    self.actor.climbing = if ascending {
                        ClimbingState::Ascending
                    } else {
                        ClimbingState::Descending
                    };
                    self.state = AiState::Climbing;
                    self.climb_next_ladder = false;
                    decisions.push(AiDecision::StartedClimbing { ascending });
                }
            }
        }

        physics::integrate(&mut self.actor, dt, grid, cfg);
        collision::resolve(&mut self.actor, grid, cfg, false);

        if !self.actor.climbing.is_climbing() {
            self.state = AiState::Patrolling;
        }

        decisions
    }

    /// Platform under the point one probe step ahead, at foot level.
    fn platform_ahead(&self, grid: &TileGrid, cfg: &SimConfig) -> bool {
        let center_x = self.actor.center(&cfg.actor).x;
        let px = center_x + self.direction * cfg.enemy.platform_probe_width / 2.0;
        let py = self.actor.pos.y + cfg.actor.size;
        !grid.tile_at_point(Layer::Platforms, px, py).is_blank()
    }

    /// Ladder one tile above (`dir = -1`) or below (`dir = 1`) the centre.
    fn ladder_toward(&self, grid: &TileGrid, cfg: &SimConfig, dir: f32) -> bool {
        let c = self.actor.center(&cfg.actor);
        grid.tile_at_point(Layer::Extras, c.x, c.y + dir * grid.tile_size()).is_ladder()
    }

    /// `Some(true)` to ascend, `Some(false)` to descend, `None` if neither way is a ladder.
    fn choose_ladder(&self, grid: &TileGrid, cfg: &SimConfig, rng: &mut impl Rng) -> Option<bool> {
        let up = self.ladder_toward(grid, cfg, -1.0);
        let down = self.ladder_toward(grid, cfg, 1.0);
        match (up, down) {
            (true, true) => Some(rng.random_bool(cfg.enemy.climb_up_chance)),
            (true, false) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}
