/// Level: the complete state of one attempt at one level.
///
/// ## Ownership
///
/// A `Level` exclusively owns its grid snapshot, its player, its enemies and
/// the RNG the enemies draw from. Nothing outside `sim` mutates them; the
/// front end only reads through the accessors below. On `Failed` or
/// `Complete` the driver drops the value and builds a new one.
///
/// ## Lifecycle
///
/// ```text
///   Playing ──► PlayerWon ──► Complete
///      │  └───► PlayerDead ─► Failed
///      └──────────────────────► Failed
/// ```
///
/// The per-frame transitions live in `step.rs`.

use glam::Vec2;
use rand::rngs::SmallRng;

use crate::config::SimConfig;
use crate::domain::ai::Enemy;
use crate::domain::grid::TileGrid;
use crate::domain::player::Player;
use crate::domain::tile::Spawn;
use crate::error::LevelError;
use super::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelState {
    Playing,
    PlayerDead,
    PlayerWon,
    Failed,
    Complete,
}

impl LevelState {
    /// `Failed` and `Complete` end the attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelState::Failed | LevelState::Complete)
    }
}

pub struct Level {
    pub(super) number: usize,
    pub(super) name: String,
    pub(super) state: LevelState,
    pub(super) grid: TileGrid,
    pub(super) player: Player,
    pub(super) enemies: Vec<Enemy>,
    pub(super) cfg: SimConfig,
    pub(super) rng: SmallRng,
}

impl Level {
    /// Build a level from its definition. Exactly one player spawn is
    /// required; enemies are created in spawn-layer order.
    pub fn new(number: usize, def: &LevelDef, cfg: &SimConfig, mut rng: SmallRng) -> Result<Self, LevelError> {
        cfg.validate()?;
        let grid = def.grid(cfg.world.tile_size)?;
        let tile = cfg.world.tile_size;
        let at = |x: usize, y: usize| Vec2::new(x as f32 * tile, y as f32 * tile);

        let players: Vec<Vec2> = def
            .spawn_cells()
            .filter(|&(_, _, s)| s == Spawn::Player)
            .map(|(x, y, _)| at(x, y))
            .collect();
        let player = match players.as_slice() {
            [] => return Err(LevelError::MissingPlayerSpawn { level: number }),
            [pos] => Player::new(*pos),
            _ => return Err(LevelError::MultiplePlayerSpawns { level: number, count: players.len() }),
        };

        let enemies: Vec<Enemy> = def
            .spawn_cells()
            .filter(|&(_, _, s)| s == Spawn::Enemy)
            .map(|(x, y, _)| Enemy::spawn(at(x, y), cfg, &mut rng))
            .collect();

        log::info!(
            "level {number} '{}': {} enemies, {} coins, {} items",
            def.name,
            enemies.len(),
            grid.coins_left(),
            grid.collectibles_left(),
        );

        Ok(Level {
            number,
            name: def.name.clone(),
            state: LevelState::Playing,
            grid,
            player,
            enemies,
            cfg: cfg.clone(),
            rng,
        })
    }

    pub fn number(&self) -> usize { self.number }
    pub fn name(&self) -> &str { &self.name }
    pub fn state(&self) -> LevelState { self.state }
    pub fn grid(&self) -> &TileGrid { &self.grid }
    pub fn player(&self) -> &Player { &self.player }
    pub fn enemies(&self) -> &[Enemy] { &self.enemies }
    pub fn config(&self) -> &SimConfig { &self.cfg }
    pub fn score(&self) -> u32 { self.player.score() }

    /// The player lost this attempt.
    pub fn failed(&self) -> bool { self.state == LevelState::Failed }

    /// The celebration finished; move on to the next level.
    pub fn complete(&self) -> bool { self.state == LevelState::Complete }

    /// Celebration in progress.
    pub fn won(&self) -> bool { self.state == LevelState::PlayerWon }
}
