/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, incomplete or invalid.
///
/// Every tuning constant the simulation uses lives in `SimConfig`;
/// the core never hard-codes speeds, sizes or probabilities.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Public Config Structs ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

/// Everything the simulation core reads. Cloned into each `Level`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub actor: ActorConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub score: ScoreConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub tile_size: f32,
    pub width_tiles: usize,   // every level of the title has these dimensions
    pub height_tiles: usize,
    pub gravity: f32,       // px/s², downwards
    pub max_dt: f32,        // frame hitches are clamped to this before stepping
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActorConfig {
    pub size: f32,               // sprite box, top-left anchored
    pub border: f32,             // horizontal hitbox inset on each side
    pub one_way_tolerance: f32,  // max penetration a ladder-top platform still catches
    pub ladder_window: f32,      // max horizontal centre offset to grab a ladder
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub run_speed: f32,
    pub jump_speed: f32,
    pub climb_speed: f32,
    pub death_jump_speed: f32,
    pub celebration_jump_speed: f32,
    pub celebration_jumps: u32,
    pub celebration_max_secs: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub climb_speed: f32,
    pub platform_probe_width: f32,
    pub climb_next_ladder_chance: f64,  // per patrolling frame
    pub climb_up_chance: f64,           // when both directions are climbable
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreConfig {
    pub coin: u32,
    pub gem: u32,
    pub collectible_border: f32,
    pub collectible_size: f32,
    pub gems_required: bool,  // false: only coins gate the win
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub start_level: usize,
    pub seed: Option<u64>,
    pub levels_file: Option<PathBuf>,
    pub frame_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct TomlConfig {
    world: WorldConfig,
    actor: ActorConfig,
    player: PlayerConfig,
    enemy: EnemyConfig,
    score: ScoreConfig,
    general: GeneralConfig,
    gamepad: GamepadConfig,
}

// ── Defaults ──

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            tile_size: 8.0,
            width_tiles: 15,
            height_tiles: 15,
            gravity: 375.0,
            max_dt: 0.05,
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        ActorConfig {
            size: 8.0,
            border: 2.0,
            one_way_tolerance: 2.0,
            ladder_window: 2.0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            run_speed: 50.0,
            jump_speed: 125.0,
            climb_speed: 40.0,
            death_jump_speed: 100.0,
            celebration_jump_speed: 100.0,
            celebration_jumps: 5,
            celebration_max_secs: 6.0,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            min_speed: 10.0,
            max_speed: 20.0,
            climb_speed: 20.0,
            platform_probe_width: 8.0,
            climb_next_ladder_chance: 0.01,
            climb_up_chance: 0.5,
        }
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            coin: 1,
            gem: 5,
            collectible_border: 2.0,
            collectible_size: 4.0,
            gems_required: false,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            start_level: 0,
            seed: None,
            levels_file: None,
            frame_ms: 16,
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            jump: vec!["A".into(), "B".into()],
            restart: vec!["Start".into()],
            quit: vec!["Select".into()],
        }
    }
}

// ── Derived quantities ──

impl ActorConfig {
    /// Width of the inset hitbox.
    pub fn hitbox_width(&self) -> f32 {
        self.size - 2.0 * self.border
    }
}

impl SimConfig {
    /// Reject values the physics cannot work with. NaN and infinities fail
    /// every check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        let a = &self.actor;
        let p = &self.player;
        let e = &self.enemy;
        let s = &self.score;

        for (name, v) in [
            ("world.tile_size", w.tile_size),
            ("world.max_dt", w.max_dt),
            ("actor.size", a.size),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} = {v} must be positive")));
            }
        }
        for (name, v) in [
            ("world.gravity", w.gravity),
            ("actor.border", a.border),
            ("actor.one_way_tolerance", a.one_way_tolerance),
            ("actor.ladder_window", a.ladder_window),
            ("player.run_speed", p.run_speed),
            ("player.jump_speed", p.jump_speed),
            ("player.climb_speed", p.climb_speed),
            ("player.death_jump_speed", p.death_jump_speed),
            ("player.celebration_jump_speed", p.celebration_jump_speed),
            ("player.celebration_max_secs", p.celebration_max_secs),
            ("enemy.min_speed", e.min_speed),
            ("enemy.max_speed", e.max_speed),
            ("enemy.climb_speed", e.climb_speed),
            ("enemy.platform_probe_width", e.platform_probe_width),
            ("score.collectible_border", s.collectible_border),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} = {v} must be zero or more")));
            }
        }

        if w.width_tiles == 0 || w.height_tiles == 0 {
            return Err(ConfigError::Invalid("world dimensions must be positive".into()));
        }
        if !(a.size <= w.tile_size && a.hitbox_width() > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "actor.border {} leaves no hitbox inside size {}", a.border, a.size,
            )));
        }
        if !(e.min_speed <= e.max_speed) {
            return Err(ConfigError::Invalid(format!(
                "enemy speed range [{}, {}] is inverted", e.min_speed, e.max_speed,
            )));
        }
        for (name, p) in [
            ("enemy.climb_next_ladder_chance", e.climb_next_ladder_chance),
            ("enemy.climb_up_chance", e.climb_up_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} = {p} is not a probability")));
            }
        }
        if !(s.collectible_size > 0.0 && s.collectible_border + s.collectible_size <= w.tile_size) {
            return Err(ConfigError::Invalid("collectible box must fit inside a tile".into()));
        }
        Ok(())
    }
}

// ── Loading ──

impl GameConfig {
    /// Parse a config document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        let cfg = GameConfig {
            sim: SimConfig {
                world: toml_cfg.world,
                actor: toml_cfg.actor,
                player: toml_cfg.player,
                enemy: toml_cfg.enemy,
                score: toml_cfg.score,
            },
            general: toml_cfg.general,
            gamepad: toml_cfg.gamepad,
        };
        cfg.sim.validate()?;
        Ok(cfg)
    }

    /// Read and parse a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory, (3) XDG data dir.
    /// Missing file falls back to defaults; a broken file is logged and ignored.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match Self::from_file(&path) {
                Ok(cfg) => {
                    log::info!("loaded config from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{}: {e}; using default settings", path.display());
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/ninja-thief");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}
