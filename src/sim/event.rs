/// Events emitted during a level update.
/// The presentation layer consumes these for effects and the status line.

use crate::domain::tile::Collectible;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    CollectiblePicked { x: usize, y: usize, kind: Collectible, points: u32 },
    PlayerJumped,
    PlayerKilled,
    PlayerWon,
    PlayerFellOff,
    LevelFailed,
    LevelComplete,
    EnemyTurned { index: usize },
    EnemyStartedClimbing { index: usize, ascending: bool },
}
