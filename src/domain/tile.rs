/// Tile ids and their properties.
///
/// A tile id is a sprite-sheet index; the same number is what the front end
/// draws. Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use serde::Deserialize;

use crate::config::ScoreConfig;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u8);

impl TileId {
    /// "No tile" in every layer.
    pub const BLANK: TileId = TileId(255);

    // Platform layer
    pub const PLATFORM_LEFT: TileId = TileId(0);
    pub const PLATFORM_MIDDLE: TileId = TileId(1);
    pub const PLATFORM_RIGHT: TileId = TileId(2);
    pub const PLATFORM_SINGLE: TileId = TileId(3);

    // Extras layer
    pub const LADDER: TileId = TileId(11);
    pub const GEM: TileId = TileId(18);
    pub const COIN: TileId = TileId(19);

    // Background decoration
    pub const PIPE_VERTICAL: TileId = TileId(24);
    pub const PIPE_HORIZONTAL: TileId = TileId(25);
    pub const PIPE_JOINT: TileId = TileId(26);

    // Spawn layer: the idle sprite of each ninja colour
    pub const PLAYER_SPAWN: TileId = TileId(32);
    pub const ENEMY_SPAWN: TileId = TileId(32 + Self::RED_OFFSET);

    /// Sprite offset from the blue (player) ninja to the red (enemy) one.
    pub const RED_OFFSET: u8 = 4;

    pub fn is_blank(self) -> bool {
        self == Self::BLANK
    }

    pub fn is_ladder(self) -> bool {
        self == Self::LADDER
    }

    /// Coin or gem, if this extras tile is one.
    pub fn collectible(self) -> Option<Collectible> {
        match self {
            Self::COIN => Some(Collectible::Coin),
            Self::GEM => Some(Collectible::Gem),
            _ => None,
        }
    }

    /// Which actor this spawn-layer id creates, if any.
    pub fn spawn(self) -> Option<Spawn> {
        match self {
            Self::PLAYER_SPAWN => Some(Spawn::Player),
            Self::ENEMY_SPAWN => Some(Spawn::Enemy),
            _ => None,
        }
    }
}

impl Default for TileId {
    fn default() -> Self {
        TileId::BLANK
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Collectible {
    Coin,
    Gem,
}

impl Collectible {
    pub fn points(self, score: &ScoreConfig) -> u32 {
        match self {
            Collectible::Coin => score.coin,
            Collectible::Gem => score.gem,
        }
    }

    pub fn tile(self) -> TileId {
        match self {
            Collectible::Coin => TileId::COIN,
            Collectible::Gem => TileId::GEM,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Spawn {
    Player,
    Enemy,
}
