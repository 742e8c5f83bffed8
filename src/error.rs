/// Error types for level loading and configuration.
///
/// The per-frame simulation is total and never returns an error; only
/// building a level, reading a level pack and reading the config can fail.

use std::io;

use crate::domain::grid::Layer;

/// A level definition that violates the level-data contract.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("level {level} has no player spawn marker")]
    MissingPlayerSpawn { level: usize },

    #[error("level {level} has {count} player spawn markers, expected exactly one")]
    MultiplePlayerSpawns { level: usize, count: usize },

    #[error("{layer:?} layer holds {found} tiles, expected {expected}")]
    LayerSize { layer: Layer, expected: usize, found: usize },

    #[error("level '{level}' row {row} is {found} tiles wide, expected {expected}")]
    BadRow { level: String, row: usize, expected: usize, found: usize },

    #[error("level '{level}' uses unknown map glyph {glyph:?}")]
    UnknownGlyph { level: String, glyph: char },

    #[error("level '{level}' is {width}x{height} tiles, expected {expected_width}x{expected_height}")]
    WrongSize { level: String, width: usize, height: usize, expected_width: usize, expected_height: usize },

    #[error("level {index} is out of range for a table of {count}")]
    NoSuchLevel { index: usize, count: usize },

    #[error("level table is empty")]
    EmptyTable,

    #[error("cannot build a level: {0}")]
    Config(String),
}

impl From<ConfigError> for LevelError {
    fn from(e: ConfigError) -> Self {
        LevelError::Config(e.to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(thiserror::Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("level pack parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("level pack error: {0}")]
    Level(#[from] LevelError),
}
