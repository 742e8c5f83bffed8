/// Shared actor state for the player and the enemies.
///
/// The two kinds run through the same kinematics and collision pipeline;
/// `Team` is the tag that tells the resolver and the climb speed apart.

use glam::Vec2;

use super::physics::Aabb;
use crate::config::{ActorConfig, SimConfig};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Which ninja an actor is. Selects sprite colour and climb speed,
/// and gates item pickup in the resolver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Team {
    Player,
    Enemy,
}

/// Ladder state. Anything other than `None` suspends gravity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClimbingState {
    None,
    Idle,
    Ascending,
    Descending,
}

impl ClimbingState {
    #[inline]
    pub fn is_climbing(self) -> bool {
        self != ClimbingState::None
    }
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) facing: Facing,
    pub(crate) team: Team,
    pub(crate) can_jump: bool,
    pub(crate) can_climb: bool,
    pub(crate) climbing: ClimbingState,
    // Dead actors keep falling under gravity but ignore all tiles.
    pub(crate) dead: bool,
}

impl Actor {
    pub fn new(team: Team, pos: Vec2) -> Self {
        Actor {
            pos,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            team,
            can_jump: false,
            can_climb: false,
            climbing: ClimbingState::None,
            dead: false,
        }
    }

    pub fn position(&self) -> Vec2 { self.pos }
    pub fn velocity(&self) -> Vec2 { self.vel }
    pub fn facing(&self) -> Facing { self.facing }
    pub fn team(&self) -> Team { self.team }
    pub fn can_jump(&self) -> bool { self.can_jump }
    pub fn can_climb(&self) -> bool { self.can_climb }
    pub fn climbing(&self) -> ClimbingState { self.climbing }
    pub fn is_dead(&self) -> bool { self.dead }

    /// Inset collision box: narrower than the sprite, full height.
    pub fn hitbox(&self, cfg: &ActorConfig) -> Aabb {
        Aabb::new(self.pos.x + cfg.border, self.pos.y, cfg.hitbox_width(), cfg.size)
    }

    /// Centre of the sprite box.
    pub fn center(&self, cfg: &ActorConfig) -> Vec2 {
        self.pos + Vec2::splat(cfg.size / 2.0)
    }

    /// Strict overlap of both inset hitboxes. Touching edges do not count.
    pub fn overlaps(&self, other: &Actor, cfg: &ActorConfig) -> bool {
        self.hitbox(cfg).overlaps(&other.hitbox(cfg))
    }

    /// Ladder speed for this actor's team.
    pub fn climb_speed(&self, cfg: &SimConfig) -> f32 {
        match self.team {
            Team::Player => cfg.player.climb_speed,
            Team::Enemy => cfg.enemy.climb_speed,
        }
    }

    /// Upward impulse. Leaving the ground always leaves the ladder too.
    pub(crate) fn jump(&mut self, speed: f32) {
        self.vel.y = -speed;
        self.climbing = ClimbingState::None;
    }
}
