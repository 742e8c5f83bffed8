/// Level definitions and the level table.
///
/// ## Sources (priority order):
///   1. TOML level pack named by `general.levels_file`
///   2. Built-in embedded levels
///
/// ## Pack format (TOML):
///   ```toml
///   name = "My Pack"
///
///   [[level]]
///   name = "Level 1"
///   map = [ "...15 rows..." ]
///   background = [ "...optional, same size..." ]
///
///   [[level]]
///   name = "Level 2"            # raw sprite ids, row-major
///   width = 15
///   height = 15
///   platforms = [ ... ]
///   extras = [ ... ]
///   spawns = [ ... ]
///   background = [ ... ]        # optional
///   ```
///
/// ## Map legend:
///   '#' = Platform               '%' = Platform with ladder (one-way top)
///   'H' = Ladder                 '$' = Coin
///   '*' = Gem                    'P' = Player spawn
///   'E' = Enemy spawn            ' ' / '.' = Empty
///
/// ## Background legend:
///   '|' = Vertical pipe   '-' = Horizontal pipe   '+' = Pipe joint
///
/// A platform run gets left/middle/right cap sprites, or the single sprite
/// when it is one tile wide. Ladders should reach one tile above the
/// platform they lead onto, or the top can only be left by jumping.

use std::path::Path;

use serde::Deserialize;

use crate::config::WorldConfig;
use crate::domain::grid::{Layer, TileGrid};
use crate::domain::tile::{Spawn, TileId};
use crate::error::{LevelError, PackError};

/// One level as supplied by the level-data table: dimensions plus the three
/// tile layers and the spawn layer, all row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub platforms: Vec<TileId>,
    pub extras: Vec<TileId>,
    pub background: Vec<TileId>,
    pub spawns: Vec<TileId>,
}

impl LevelDef {
    pub fn from_arrays(
        name: &str,
        width: usize,
        height: usize,
        platforms: Vec<TileId>,
        extras: Vec<TileId>,
        background: Vec<TileId>,
        spawns: Vec<TileId>,
    ) -> Result<Self, LevelError> {
        let expected = width * height;
        for (layer, tiles) in [
            (Layer::Platforms, &platforms),
            (Layer::Extras, &extras),
            (Layer::Background, &background),
            (Layer::Spawns, &spawns),
        ] {
            if tiles.len() != expected {
                return Err(LevelError::LayerSize { layer, expected, found: tiles.len() });
            }
        }
        Ok(LevelDef { name: name.to_string(), width, height, platforms, extras, background, spawns })
    }

    /// Parse a map diagram. `background` is either empty or the same size as `rows`.
    pub fn from_ascii<S: AsRef<str>>(name: &str, rows: &[S], background: &[S]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let size = width * height;

        let mut platforms = vec![TileId::BLANK; size];
        let mut extras = vec![TileId::BLANK; size];
        let mut spawns = vec![TileId::BLANK; size];

        for (y, row) in rows.iter().enumerate() {
            let row = checked_row(name, y, row.as_ref(), width)?;
            for (x, ch) in row.chars().enumerate() {
                let i = y * width + x;
                match ch {
                    '#' => platforms[i] = TileId::PLATFORM_MIDDLE,
                    '%' => {
                        platforms[i] = TileId::PLATFORM_MIDDLE;
                        extras[i] = TileId::LADDER;
                    }
                    'H' => extras[i] = TileId::LADDER,
                    '$' => extras[i] = TileId::COIN,
                    '*' => extras[i] = TileId::GEM,
                    'P' => spawns[i] = TileId::PLAYER_SPAWN,
                    'E' => spawns[i] = TileId::ENEMY_SPAWN,
                    ' ' | '.' => {}
                    glyph => return Err(LevelError::UnknownGlyph { level: name.to_string(), glyph }),
                }
            }
        }
        cap_platform_runs(&mut platforms, width);

        let background = if background.is_empty() {
            vec![TileId::BLANK; size]
        } else {
            if background.len() != height {
                return Err(LevelError::WrongSize {
                    level: name.to_string(),
                    width,
                    height: background.len(),
                    expected_width: width,
                    expected_height: height,
                });
            }
            let mut tiles = Vec::with_capacity(size);
            for (y, row) in background.iter().enumerate() {
                for ch in checked_row(name, y, row.as_ref(), width)?.chars() {
                    tiles.push(match ch {
                        '|' => TileId::PIPE_VERTICAL,
                        '-' => TileId::PIPE_HORIZONTAL,
                        '+' => TileId::PIPE_JOINT,
                        ' ' | '.' => TileId::BLANK,
                        glyph => return Err(LevelError::UnknownGlyph { level: name.to_string(), glyph }),
                    });
                }
            }
            tiles
        };

        Ok(LevelDef { name: name.to_string(), width, height, platforms, extras, background, spawns })
    }

    /// Fresh grid for one attempt at this level.
    pub fn grid(&self, tile_size: f32) -> Result<TileGrid, LevelError> {
        TileGrid::new(
            self.width,
            self.height,
            tile_size,
            self.platforms.clone(),
            self.extras.clone(),
            self.background.clone(),
        )
    }

    /// Spawn markers with their cell coordinates. Unknown ids are skipped.
    pub fn spawn_cells(&self) -> impl Iterator<Item = (usize, usize, Spawn)> + '_ {
        let width = self.width.max(1);
        self.spawns.iter().enumerate().filter_map(move |(i, id)| {
            id.spawn().map(|s| (i % width, i / width, s))
        })
    }
}

fn checked_row<'a>(level: &str, row: usize, text: &'a str, width: usize) -> Result<&'a str, LevelError> {
    let found = text.chars().count();
    if found != width {
        return Err(LevelError::BadRow { level: level.to_string(), row, expected: width, found });
    }
    Ok(text)
}

/// Replace every horizontal platform run with cap sprites.
fn cap_platform_runs(platforms: &mut [TileId], width: usize) {
    if width == 0 { return; }
    for row in platforms.chunks_mut(width) {
        let mut x = 0;
        while x < row.len() {
            if row[x].is_blank() {
                x += 1;
                continue;
            }
            let start = x;
            while x < row.len() && !row[x].is_blank() {
                x += 1;
            }
            let end = x - 1;
            if start == end {
                row[start] = TileId::PLATFORM_SINGLE;
            } else {
                row[start] = TileId::PLATFORM_LEFT;
                row[end] = TileId::PLATFORM_RIGHT;
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Level table
// ══════════════════════════════════════════════════════════════

/// Ordered, non-empty list of levels, indexed by level number.
#[derive(Clone, Debug)]
pub struct LevelTable {
    name: String,
    levels: Vec<LevelDef>,
}

#[derive(Deserialize)]
struct PackFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "level")]
    levels: Vec<PackLevel>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PackLevel {
    Ascii {
        name: String,
        map: Vec<String>,
        #[serde(default)]
        background: Vec<String>,
    },
    Raw {
        name: String,
        width: usize,
        height: usize,
        platforms: Vec<TileId>,
        extras: Vec<TileId>,
        spawns: Vec<TileId>,
        #[serde(default)]
        background: Option<Vec<TileId>>,
    },
}

impl PackLevel {
    fn into_def(self) -> Result<LevelDef, LevelError> {
        match self {
            PackLevel::Ascii { name, map, background } => LevelDef::from_ascii(&name, &map[..], &background[..]),
            PackLevel::Raw { name, width, height, platforms, extras, spawns, background } => {
                let background = background.unwrap_or_else(|| vec![TileId::BLANK; width * height]);
                LevelDef::from_arrays(&name, width, height, platforms, extras, background, spawns)
            }
        }
    }
}

impl LevelTable {
    pub fn new(name: &str, levels: Vec<LevelDef>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyTable);
        }
        Ok(LevelTable { name: name.to_string(), levels })
    }

    /// The levels compiled into the binary.
    pub fn builtin() -> Result<Self, LevelError> {
        let levels = BUILTIN
            .iter()
            .map(|&(name, map, background)| LevelDef::from_ascii(name, map, background))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new("Built-in", levels)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PackError> {
        let pack: PackFile = toml::from_str(text)?;
        let levels = pack
            .levels
            .into_iter()
            .map(PackLevel::into_def)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(pack.name.as_deref().unwrap_or("Unnamed pack"), levels)?)
    }

    pub fn load(path: &Path) -> Result<Self, PackError> {
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&text)?;
        log::info!("loaded {} levels from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn len(&self) -> usize { self.levels.len() }

    /// Never true for a constructed table.
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    pub fn get(&self, index: usize) -> Result<&LevelDef, LevelError> {
        self.levels.get(index).ok_or(LevelError::NoSuchLevel { index, count: self.levels.len() })
    }

    /// Level after `index`, wrapping to the first.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    /// Every level must have the title's configured dimensions.
    pub fn check_size(&self, world: &WorldConfig) -> Result<(), LevelError> {
        for def in &self.levels {
            if def.width != world.width_tiles || def.height != world.height_tiles {
                return Err(LevelError::WrongSize {
                    level: def.name.clone(),
                    width: def.width,
                    height: def.height,
                    expected_width: world.width_tiles,
                    expected_height: world.height_tiles,
                });
            }
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

type Embedded = (&'static str, &'static [&'static str], &'static [&'static str]);

const BUILTIN: &[Embedded] = &[
    ("Night Shift", &[
        "               ",
        "               ",
        "               ",
        "               ",
        "  $H    $  H$  ",
        " ##%#######%## ",
        "   H       H   ",
        "   H       H   ",
        "   H       H   ",
        " $ H  EH $ H $ ",
        "#######%#######",
        "       H       ",
        "       H       ",
        "  $ P  H   E $ ",
        "###############",
    ], &[
        "+-------------+",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
        "|             |",
    ]),
    ("Scaffolding", &[
        "               ",
        "               ",
        "  $    *    $  ",
        " H    ###    H ",
        " %###     ###% ",
        " H           H ",
        " H   $   $   H ",
        " H  ###H###  H ",
        " H     H     H ",
        " H  E  H  E  H ",
        "#######%#######",
        "       H       ",
        "  $    H    $  ",
        "   P   H   E   ",
        "###############",
    ], &[]),
    ("Split Level", &[
        "               ",
        "  $    H    $  ",
        " ######%###### ",
        "       H       ",
        "       H       ",
        " E H $ H $ H E ",
        "###%###%###%###",
        "   H   H   H   ",
        "   H   H   H   ",
        " $ H * H   H $ ",
        " ##%###%# #%## ",
        "   H   H   H   ",
        "   H   H   H   ",
        " $ H   H P H $ ",
        "###############",
    ], &[]),
];
