/// Level driver: owns the current `Level` and replaces it by value.
///
///   - `Failed`   → the same level is rebuilt
///   - `Complete` → the next level, wrapping to the first after the last
///
/// Every rebuilt level gets a fresh RNG derived from the session's own,
/// so a seeded session replays identically.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::domain::input::InputSnapshot;
use crate::error::LevelError;
use super::event::GameEvent;
use super::level::LevelTable;
use super::world::Level;

pub struct Session {
    table: LevelTable,
    cfg: SimConfig,
    rng: SmallRng,
    level: Level,
    total_score: u32,
    attempts: u32,
}

impl Session {
    /// Start at `start` (wrapped into the table). `seed = None` seeds from the OS.
    pub fn new(table: LevelTable, cfg: SimConfig, start: usize, seed: Option<u64>) -> Result<Self, LevelError> {
        cfg.validate()?;
        table.check_size(&cfg.world)?;
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        let index = start % table.len();
        let level = build(&table, index, &cfg, &mut rng)?;
        Ok(Session { table, cfg, rng, level, total_score: 0, attempts: 1 })
    }

    pub fn level(&self) -> &Level { &self.level }
    pub fn table(&self) -> &LevelTable { &self.table }

    /// Points banked from completed levels plus the current attempt's score.
    pub fn total_score(&self) -> u32 { self.total_score + self.level.score() }

    /// Attempts at the current level, including this one.
    pub fn attempts(&self) -> u32 { self.attempts }

    /// Advance one frame. `dt` is clamped to `[0, max_dt]` first.
    pub fn tick(&mut self, dt: f32, input: &impl InputSnapshot) -> Result<Vec<GameEvent>, LevelError> {
        let dt = dt.clamp(0.0, self.cfg.world.max_dt);
        let events = self.level.update(dt, input);

        if self.level.failed() {
            log::info!("level {} failed", self.level.number());
            self.restart()?;
        } else if self.level.complete() {
            let next = self.table.next_index(self.level.number());
            log::info!("level {} complete, score {}", self.level.number(), self.level.score());
            self.total_score += self.level.score();
            self.level = build(&self.table, next, &self.cfg, &mut self.rng)?;
            self.attempts = 1;
        }
        Ok(events)
    }

    /// Rebuild the current level from scratch. Its score is lost.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.level = build(&self.table, self.level.number(), &self.cfg, &mut self.rng)?;
        self.attempts += 1;
        Ok(())
    }
}

fn build(table: &LevelTable, index: usize, cfg: &SimConfig, rng: &mut SmallRng) -> Result<Level, LevelError> {
    let def = table.get(index)?;
    Level::new(index, def, cfg, SmallRng::seed_from_u64(rng.random()))
}
