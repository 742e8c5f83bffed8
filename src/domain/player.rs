/// Player controller: input intent → velocity, then the shared pipeline.
///
/// ## One frame
///
///   1. `vx = 0`
///   2. won   → bounce whenever grounded, until the bounces run out
///      alive → run (left/right held, opposing intents cancel),
///              climb (up/down while a ladder is in reach),
///              jump (rising edge only, and only if `can_jump`)
///      dead  → no control; the death impulse plays out under gravity
///   3. kinematics + collision resolver
///   4. pickups reported by the resolver add to `score`
///
/// `can_jump` / `can_climb` are read as the previous frame's resolver left them.

use glam::Vec2;

use super::collision::{self, Pickup};
use super::entity::{Actor, ClimbingState, Team};
use super::grid::TileGrid;
use super::input::{Button, InputSnapshot};
use super::physics;
use crate::config::SimConfig;

#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) actor: Actor,
    score: u32,
    won: bool,
    celebration_jumps_left: u32,
    celebration_elapsed: f32,
}

/// What happened to the player during one `update`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerFrame {
    pub pickups: Vec<Pickup>,
    pub jumped: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Player {
            actor: Actor::new(Team::Player, pos),
            score: 0,
            won: false,
            celebration_jumps_left: 0,
            celebration_elapsed: 0.0,
        }
    }

    pub fn actor(&self) -> &Actor { &self.actor }
    pub fn position(&self) -> Vec2 { self.actor.pos }
    pub fn score(&self) -> u32 { self.score }
    pub fn is_dead(&self) -> bool { self.actor.dead }
    pub fn has_won(&self) -> bool { self.won }

    pub fn update(
        &mut self,
        dt: f32,
        input: &impl InputSnapshot,
        grid: &mut TileGrid,
        cfg: &SimConfig,
        pickups_enabled: bool,
    ) -> PlayerFrame {
        let mut frame = PlayerFrame::default();
        self.actor.vel.x = 0.0;

        if self.won {
            self.celebration_elapsed += dt;
            if self.actor.can_jump && self.celebration_jumps_left > 0 {
                self.actor.jump(cfg.player.celebration_jump_speed);
                self.celebration_jumps_left -= 1;
                frame.jumped = true;
            }
        } else if !self.actor.dead {
            frame.jumped = self.steer(input, cfg);
        }

        physics::integrate(&mut self.actor, dt, grid, cfg);

        let collect = pickups_enabled && !self.won;
        frame.pickups = collision::resolve(&mut self.actor, grid, cfg, collect);
        for p in &frame.pickups {
            self.score += p.points;
        }

        frame
    }

    /// Apply held/pressed input. Returns whether a jump was taken.
    fn steer(&mut self, input: &impl InputSnapshot, cfg: &SimConfig) -> bool {
        let a = &mut self.actor;

        if input.is_held(Button::Left) {
            a.vel.x -= cfg.player.run_speed;
        }
        if input.is_held(Button::Right) {
            a.vel.x += cfg.player.run_speed;
        }

        if a.can_climb {
            let up = input.is_held(Button::Up);
            let down = input.is_held(Button::Down);
            if up != down {
                a.climbing = if up { ClimbingState::Ascending } else { ClimbingState::Descending };
            } else if a.climbing.is_climbing() {
                a.climbing = ClimbingState::Idle;
            }
        }

        if input.was_pressed(Button::Jump) && a.can_jump {
            a.jump(cfg.player.jump_speed);
            return true;
        }
        false
    }

    /// Start the death fall. Repeated calls do nothing.
    pub fn set_dead(&mut self, cfg: &SimConfig) {
        if self.actor.dead { return; }
        self.actor.dead = true;
        self.actor.jump(cfg.player.death_jump_speed);
    }

    /// Start the victory bounces. Repeated calls do nothing.
    pub fn set_won(&mut self, cfg: &SimConfig) {
        if self.won { return; }
        self.won = true;
        self.celebration_jumps_left = cfg.player.celebration_jumps;
        self.celebration_elapsed = 0.0;
    }

    /// Landed after the last bounce, or ran out of time.
    pub fn finished_celebrating(&self, cfg: &SimConfig) -> bool {
        self.won
            && ((self.actor.can_jump && self.celebration_jumps_left == 0)
                || self.celebration_elapsed >= cfg.player.celebration_max_secs)
    }
}
