/// The step function: advances a level by one frame.
///
/// Processing order while `Playing`:
///   1. Player (input, kinematics, collision, pickups)
///   2. Enemies, in spawn order (AI, kinematics, collision)
///   3. Transition check, first match wins:
///        all coins collected  → PlayerWon
///        player touches enemy → PlayerDead
///        player below grid    → Failed
///
/// `PlayerDead` / `PlayerWon` only advance the player so the death fall or
/// victory bounces play out. Enemies freeze, nothing is picked up and enemy
/// contact is ignored. `Failed` / `Complete` do nothing.
///
/// `dt` is used as given; the driver clamps it.

use crate::domain::ai::AiDecision;
use crate::domain::input::InputSnapshot;
use super::event::GameEvent;
use super::world::{Level, LevelState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

impl Level {
    pub fn update(&mut self, dt: f32, input: &impl InputSnapshot) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.state {
            LevelState::Playing => resolve_playing(self, dt, input, &mut events),
            LevelState::PlayerDead => resolve_dead(self, dt, input, &mut events),
            LevelState::PlayerWon => resolve_won(self, dt, input, &mut events),
            LevelState::Failed | LevelState::Complete => {}
        }
        events
    }
}

fn enter(level: &mut Level, state: LevelState) {
    log::debug!("level {}: {:?} -> {:?}", level.number, level.state, state);
    level.state = state;
}

// ══════════════════════════════════════════════════════════════
// Playing
// ══════════════════════════════════════════════════════════════

fn resolve_playing(level: &mut Level, dt: f32, input: &impl InputSnapshot, events: &mut Vec<GameEvent>) {
    resolve_player(level, dt, input, true, events);
    resolve_enemies(level, dt, events);

    if all_collected(level) {
        level.player.set_won(&level.cfg);
        enter(level, LevelState::PlayerWon);
        events.push(GameEvent::PlayerWon);
    } else if touches_enemy(level) {
        level.player.set_dead(&level.cfg);
        enter(level, LevelState::PlayerDead);
        events.push(GameEvent::PlayerKilled);
    } else if fell_off(level) {
        enter(level, LevelState::Failed);
        events.push(GameEvent::PlayerFellOff);
        events.push(GameEvent::LevelFailed);
    }
}

fn resolve_player(
    level: &mut Level,
    dt: f32,
    input: &impl InputSnapshot,
    pickups_enabled: bool,
    events: &mut Vec<GameEvent>,
) {
    let frame = level.player.update(dt, input, &mut level.grid, &level.cfg, pickups_enabled);
    if frame.jumped {
        events.push(GameEvent::PlayerJumped);
    }
    for p in frame.pickups {
        log::trace!("picked up {:?} at ({}, {}) for {}", p.kind, p.x, p.y, p.points);
        events.push(GameEvent::CollectiblePicked { x: p.x, y: p.y, kind: p.kind, points: p.points });
    }
}

fn resolve_enemies(level: &mut Level, dt: f32, events: &mut Vec<GameEvent>) {
    for (index, enemy) in level.enemies.iter_mut().enumerate() {
        for decision in enemy.update(dt, &mut level.grid, &level.cfg, &mut level.rng) {
            log::debug!("enemy {index}: {decision:?}");
            events.push(match decision {
                AiDecision::Turned => GameEvent::EnemyTurned { index },
                AiDecision::StartedClimbing { ascending } => GameEvent::EnemyStartedClimbing { index, ascending },
            });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Death fall / celebration
// ══════════════════════════════════════════════════════════════

fn resolve_dead(level: &mut Level, dt: f32, input: &impl InputSnapshot, events: &mut Vec<GameEvent>) {
    resolve_player(level, dt, input, false, events);
    if fell_off(level) {
        enter(level, LevelState::Failed);
        events.push(GameEvent::LevelFailed);
    }
}

fn resolve_won(level: &mut Level, dt: f32, input: &impl InputSnapshot, events: &mut Vec<GameEvent>) {
    resolve_player(level, dt, input, false, events);
    if level.player.finished_celebrating(&level.cfg) || fell_off(level) {
        enter(level, LevelState::Complete);
        events.push(GameEvent::LevelComplete);
    }
}

// ══════════════════════════════════════════════════════════════
// Checks
// ══════════════════════════════════════════════════════════════

/// Coins only, unless gems are configured to count too.
fn all_collected(level: &Level) -> bool {
    if level.cfg.score.gems_required {
        level.grid.collectibles_left() == 0
    } else {
        level.grid.coins_left() == 0
    }
}

fn touches_enemy(level: &Level) -> bool {
    let player = &level.player.actor;
    level.enemies.iter().any(|e| e.actor.overlaps(player, &level.cfg.actor))
}

fn fell_off(level: &Level) -> bool {
    level.player.position().y > level.grid.pixel_height()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::domain::input::{Button, FrameInput};
    use crate::sim::level::{LevelDef, LevelTable};
    use glam::Vec2;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 64.0;

    fn level_with(rows: &[&str], cfg: &SimConfig) -> Level {
        let def = LevelDef::from_ascii("t", rows, &[]).unwrap();
        Level::new(0, &def, cfg, SmallRng::seed_from_u64(42)).unwrap()
    }

    fn level_from(rows: &[&str]) -> Level {
        level_with(rows, &SimConfig::default())
    }

    fn idle() -> FrameInput {
        FrameInput::none()
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    // ── Transitions out of Playing ──

    #[test]
    fn last_coin_wins_before_enemy_contact() {
        let mut level = level_from(&[
            "      ",
            " P $E ",
            "######",
        ]);
        level.player.actor.pos = Vec2::new(22.0, 8.0);
        level.enemies[0].actor.pos = Vec2::new(24.0, 8.0);

        let events = level.update(DT, &idle());
        assert_eq!(level.state(), LevelState::PlayerWon);
        assert!(level.won());
        assert_eq!(count(&events, &GameEvent::PlayerWon), 1);
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::CollectiblePicked { x: 3, y: 1, .. })));

        // still touching, but contact no longer matters
        let events = level.update(DT, &idle());
        assert_eq!(level.state(), LevelState::PlayerWon);
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 0);
    }

    #[test]
    fn one_pixel_overlap_kills() {
        let mut level = level_from(&[
            "P  $",
            "    ",
            "  E ",
        ]);
        // player hitbox [2, 6) x [0, 8); enemy hitbox [5, 9) x [7, 15)
        level.enemies[0].actor.pos = Vec2::new(3.0, 7.0);
        let events = level.update(0.0, &idle());
        assert_eq!(level.state(), LevelState::PlayerDead);
        assert_eq!(count(&events, &GameEvent::PlayerKilled), 1);
        assert!(level.player().is_dead());
    }

    #[test]
    fn touching_edges_do_not_kill() {
        for enemy in [Vec2::new(4.0, 0.0), Vec2::new(0.0, 8.0), Vec2::new(0.0, -8.0)] {
            let mut level = level_from(&[
                "P  $",
                "    ",
                "  E ",
            ]);
            level.enemies[0].actor.pos = enemy;
            let events = level.update(0.0, &idle());
            assert_eq!(level.state(), LevelState::Playing, "enemy at {enemy}");
            assert!(events.iter().all(|e| *e != GameEvent::PlayerKilled));
        }
    }

    #[test]
    fn falling_off_fails_directly() {
        let mut level = level_from(&[
            "  P $",
            "     ",
        ]);
        let mut failed_events = None;
        for _ in 0..200 {
            let before = level.state();
            let events = level.update(DT, &idle());
            if level.state() != before {
                assert_eq!(before, LevelState::Playing);
                failed_events = Some(events);
                break;
            }
        }
        assert!(level.failed());
        assert!(level.player().position().y > level.grid().pixel_height());
        assert_eq!(failed_events, Some(vec![GameEvent::PlayerFellOff, GameEvent::LevelFailed]));
    }

    #[test]
    fn gems_count_only_when_required() {
        let rows = [
            "      ",
            " P$ * ",
            "######",
        ];
        let mut level = level_from(&rows);
        level.player.actor.pos.x = 14.0;
        level.update(DT, &idle());
        assert_eq!(level.state(), LevelState::PlayerWon);

        let mut cfg = SimConfig::default();
        cfg.score.gems_required = true;
        let mut level = level_with(&rows, &cfg);
        level.player.actor.pos.x = 14.0;
        level.update(DT, &idle());
        assert_eq!(level.state(), LevelState::Playing);
        assert_eq!(level.grid().collectibles_left(), 1);
    }

    // ── After the transition ──

    #[test]
    fn death_fall_ends_in_failed_with_enemies_frozen() {
        let mut level = level_from(&[
            "P  $",
            "    ",
            "  E ",
        ]);
        level.enemies[0].actor.pos = Vec2::new(3.0, 7.0);
        level.update(0.0, &idle());
        assert_eq!(level.state(), LevelState::PlayerDead);
        let frozen = level.enemies()[0].actor().position();

        let mut frames = 0;
        while !level.failed() {
            let events = level.update(DT, &FrameInput::none().press(Button::Jump));
            assert!(events.iter().all(|e| *e != GameEvent::PlayerJumped));
            assert_eq!(level.enemies()[0].actor().position(), frozen);
            frames += 1;
            assert!(frames < 500, "dead player never left the screen");
        }
        assert!(level.update(DT, &idle()).is_empty());
        assert_eq!(level.state(), LevelState::Failed);
    }

    #[test]
    fn celebration_ends_in_complete() {
        let mut level = level_from(&[
            "      ",
            " P$   ",
            "######",
        ]);
        level.player.actor.pos.x = 14.0;
        level.update(DT, &idle());
        assert!(level.won());
        let score = level.score();

        let mut completions = 0;
        let mut frames = 0;
        while !level.complete() {
            let events = level.update(DT, &FrameInput::none().hold(Button::Left));
            completions += count(&events, &GameEvent::LevelComplete);
            frames += 1;
            assert!(frames < 1000, "celebration never ended");
        }
        assert_eq!(completions, 1);
        assert_eq!(level.score(), score);
        assert!(level.update(DT, &idle()).is_empty());
    }

    #[test]
    fn enemy_decisions_carry_their_index() {
        let mut level = level_from(&[
            "P  $     ",
            "####     ",
            "         ",
            "     E   ",
            "   ####  ",
        ]);
        let mut turned = false;
        for _ in 0..400 {
            for e in level.update(DT, &idle()) {
                if let GameEvent::EnemyTurned { index } = e {
                    assert_eq!(index, 0);
                    turned = true;
                }
            }
        }
        assert!(turned);
        assert_eq!(level.state(), LevelState::Playing);
    }

    // ── Properties over a whole run ──

    #[test]
    fn random_play_respects_the_lifecycle() {
        use LevelState::*;

        let table = LevelTable::builtin().unwrap();
        let cfg = SimConfig::default();
        let mut inputs = SmallRng::seed_from_u64(7);

        for index in 0..table.len() {
            let def = table.get(index).unwrap();
            let mut level = Level::new(index, def, &cfg, SmallRng::seed_from_u64(index as u64)).unwrap();
            let mut score = 0;

            for _ in 0..3000 {
                let mut input = FrameInput::none();
                for b in Button::ALL {
                    if inputs.random_bool(0.3) {
                        input = if b == Button::Jump && inputs.random_bool(0.2) { input.press(b) } else { input.hold(b) };
                    }
                }

                let before = level.state();
                let events = level.update(DT, &input);
                let after = level.state();

                let legal = matches!(
                    (before, after),
                    (Playing, Playing | PlayerDead | PlayerWon | Failed)
                        | (PlayerDead, PlayerDead | Failed)
                        | (PlayerWon, PlayerWon | Complete)
                        | (Failed, Failed)
                        | (Complete, Complete)
                );
                assert!(legal, "{before:?} -> {after:?}");

                let transitions = events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::PlayerWon | GameEvent::PlayerKilled | GameEvent::PlayerFellOff))
                    .count();
                assert!(transitions <= 1);

                assert!(level.score() >= score);
                score = level.score();

                if after.is_terminal() { break; }
            }
        }
    }
}
