/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// One tile is two terminal columns wide and one row high. Actors are
/// placed by their centre at half-tile horizontal resolution.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use ninja_thief::domain::entity::{Actor, Facing, Team};
use ninja_thief::domain::grid::{Layer, TileGrid};
use ninja_thief::domain::tile::TileId;
use ninja_thief::sim::event::GameEvent;
use ninja_thief::sim::session::Session;
use ninja_thief::sim::world::LevelState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gaps between rows match the cell colour on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Self::BASE_BG }
    }

    fn on(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg).on(bg));
        }
    }

    /// Paint a whole row, then the text on top.
    fn bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg).on(bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const PLATFORM_FG: Color = Color::Rgb { r: 180, g: 120, b: 60 };
const PLATFORM_BG: Color = Color::Rgb { r: 100, g: 65, b: 30 };
const LADDER_FG: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const PIPE_FG: Color = Color::Rgb { r: 60, g: 70, b: 90 };
const COIN_FG: Color = Color::Rgb { r: 255, g: 210, b: 0 };
const GEM_FG: Color = Color::Rgb { r: 80, g: 255, b: 220 };
const PLAYER_FG: Color = Color::Rgb { r: 90, g: 140, b: 255 };
const ENEMY_FG: Color = Color::Rgb { r: 235, g: 60, b: 60 };

// ── Layout ──

/// Terminal columns per tile.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Frames a status message stays up.
const MESSAGE_FRAMES: u32 = 90;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// (level number, attempt) of the last frame; a change forces a repaint.
    last_screen: Option<(usize, u32)>,
    message: String,
    message_timer: u32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Turn this frame's events into a status message.
    pub fn note_events(&mut self, events: &[GameEvent]) {
        for event in events {
            let msg = match event {
                GameEvent::CollectiblePicked { kind, points, .. } => format!("{kind:?} +{points}"),
                GameEvent::PlayerKilled => "Caught by a guard!".to_string(),
                GameEvent::PlayerFellOff => "Fell out of the level!".to_string(),
                GameEvent::PlayerWon => "All the loot is yours!".to_string(),
                GameEvent::LevelFailed => "Try again".to_string(),
                GameEvent::LevelComplete => "Level complete".to_string(),
                GameEvent::PlayerJumped
                | GameEvent::EnemyTurned { .. }
                | GameEvent::EnemyStartedClimbing { .. } => continue,
            };
            self.message = msg;
            self.message_timer = MESSAGE_FRAMES;
        }
    }

    pub fn render(&mut self, session: &Session, pad_connected: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        let screen = (session.level().number(), session.attempts());
        if self.last_screen != Some(screen) {
            self.invalidate()?;
            self.last_screen = Some(screen);
        }

        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }

        self.front.clear();
        self.compose(session, pad_connected);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, session: &Session, pad_connected: bool) {
        let level = session.level();
        let grid = level.grid();

        // ── HUD row ──
        let hud = format!(
            " Level {}/{}  {:<16} Score:{:<4} Total:{:<6} Try:{}{} ",
            level.number() + 1,
            session.table().len(),
            level.name(),
            level.score(),
            session.total_score(),
            session.attempts(),
            if pad_connected { "  [pad]" } else { "" },
        );
        self.front.bar(HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map ──
        for gy in 0..grid.height() {
            for gx in 0..grid.width() {
                let [c0, c1] = tile_cells(grid, gx, gy);
                self.front.set(gx * CELL_W, MAP_ROW + gy, c0);
                self.front.set(gx * CELL_W + 1, MAP_ROW + gy, c1);
            }
        }

        // ── Actors: enemies first so the player stays visible ──
        let cfg = level.config();
        let actors = level
            .enemies()
            .iter()
            .map(|e| e.actor())
            .chain(std::iter::once(level.player().actor()));
        for actor in actors {
            let center = actor.center(&cfg.actor);
            let Some((col, row)) = actor_origin(center.x, center.y, grid) else { continue };
            let [c0, c1] = sprite(actor);
            // Keep the tile's background under the sprite.
            let under0 = self.front.get(col, MAP_ROW + row).bg;
            let under1 = self.front.get(col + 1, MAP_ROW + row).bg;
            self.front.set(col, MAP_ROW + row, c0.on(under0));
            self.front.set(col + 1, MAP_ROW + row, c1.on(under1));
        }

        // ── State banner / message bar ──
        let msg_row = MAP_ROW + grid.height() + 1;
        let banner = match level.state() {
            LevelState::PlayerDead => Some(" CAUGHT! "),
            LevelState::PlayerWon => Some(" LEVEL CLEAR! "),
            _ => None,
        };
        if let Some(text) = banner {
            self.front.bar(msg_row, text, Color::Black, MSG_BG);
        } else if !self.message.is_empty() {
            let msg = format!(" {} ", self.message);
            self.front.bar(msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        let help = " Arrows/WASD:Move  Space/Z/K:Jump  R:Restart  Esc:Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Cell::BASE_BG);
    }
}

/// Two terminal cells for a grid cell. Extras draw over platforms,
/// platforms over the background.
fn tile_cells(grid: &TileGrid, gx: usize, gy: usize) -> [Cell; 2] {
    let platform = !grid.platform_at(gx, gy).is_blank();
    let bg = if platform { PLATFORM_BG } else { Cell::BASE_BG };

    let extra = grid.extra_at(gx, gy);
    let cells = if extra.is_ladder() {
        [Cell::new('╠', LADDER_FG), Cell::new('╣', LADDER_FG)]
    } else if extra == TileId::COIN {
        [Cell::new('(', COIN_FG), Cell::new(')', COIN_FG)]
    } else if extra == TileId::GEM {
        [Cell::new('<', GEM_FG), Cell::new('>', GEM_FG)]
    } else if platform {
        [Cell::new('▀', PLATFORM_FG), Cell::new('▀', PLATFORM_FG)]
    } else {
        match grid.get(Layer::Background, gx, gy) {
            TileId::PIPE_VERTICAL => [Cell::new('│', PIPE_FG), Cell::BLANK],
            TileId::PIPE_HORIZONTAL => [Cell::new('─', PIPE_FG), Cell::new('─', PIPE_FG)],
            TileId::PIPE_JOINT => [Cell::new('┼', PIPE_FG), Cell::new('─', PIPE_FG)],
            _ => [Cell::BLANK, Cell::BLANK],
        }
    };
    cells.map(|c| c.on(bg))
}

fn sprite(actor: &Actor) -> [Cell; 2] {
    actor_cells(actor.team(), actor.facing(), actor.climbing().is_climbing(), actor.is_dead())
}

/// Sprite cells: colour by team, glyph by facing or climbing.
fn actor_cells(team: Team, facing: Facing, climbing: bool, dead: bool) -> [Cell; 2] {
    let fg = match (dead, team) {
        (true, _) => Color::DarkGrey,
        (false, Team::Player) => PLAYER_FG,
        (false, Team::Enemy) => ENEMY_FG,
    };
    let (c0, c1) = if dead {
        ('x', 'x')
    } else if climbing {
        ('▐', '▌')
    } else {
        match facing {
            Facing::Left => ('◀', '█'),
            Facing::Right => ('█', '▶'),
        }
    };
    [Cell::new(c0, fg), Cell::new(c1, fg)]
}

/// Left terminal column and map row of an actor centred at (cx, cy) px.
/// `None` once the centre leaves the grid (fell off, death fall).
fn actor_origin(cx: f32, cy: f32, grid: &TileGrid) -> Option<(usize, usize)> {
    if cx < 0.0 || cy < 0.0 || cx >= grid.pixel_width() || cy >= grid.pixel_height() {
        return None;
    }
    let half_tiles = (cx / grid.tile_size() * CELL_W as f32).floor() as usize;
    let col = half_tiles.saturating_sub(1).min(grid.width() * CELL_W - CELL_W);
    let row = (cy / grid.tile_size()).floor() as usize;
    Some((col, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn grid(rows: &[&str], background: &[&str]) -> TileGrid {
        ninja_thief::sim::level::LevelDef::from_ascii("t", rows, background)
            .and_then(|d| d.grid(8.0))
            .unwrap()
    }

    #[test]
    fn extras_draw_over_platforms() {
        let g = grid(&["H$*", "#%#"], &[]);
        assert_eq!(tile_cells(&g, 0, 0)[0].ch, '╠');
        assert_eq!(tile_cells(&g, 1, 0)[0].ch, '(');
        assert_eq!(tile_cells(&g, 2, 0)[0].ch, '<');

        let ladder_on_platform = tile_cells(&g, 1, 1);
        assert_eq!(ladder_on_platform[0].ch, '╠');
        assert_eq!(ladder_on_platform[0].bg, PLATFORM_BG);
        assert_eq!(tile_cells(&g, 0, 1)[1].ch, '▀');
    }

    #[test]
    fn background_only_shows_through_empty_cells() {
        let g = grid(&["  ", "# "], &["|-", "+-"]);
        assert_eq!(tile_cells(&g, 0, 0)[0].ch, '│');
        assert_eq!(tile_cells(&g, 1, 0)[1].ch, '─');
        assert_eq!(tile_cells(&g, 0, 1)[0].ch, '▀');
        assert_eq!(tile_cells(&g, 1, 1)[0].ch, '─');
    }

    #[test]
    fn actor_glyph_follows_state() {
        let fresh = sprite(&Actor::new(Team::Enemy, Vec2::ZERO));
        assert_eq!(fresh[1].ch, '▶');
        assert_eq!(fresh[0].fg, ENEMY_FG);

        assert_eq!(actor_cells(Team::Player, Facing::Left, false, false)[0].ch, '◀');
        assert_eq!(actor_cells(Team::Player, Facing::Left, true, false)[0].ch, '▐');
        let dead = actor_cells(Team::Player, Facing::Right, true, true);
        assert_eq!((dead[0].ch, dead[0].fg), ('x', Color::DarkGrey));
    }

    #[test]
    fn actor_columns_at_half_tile_resolution() {
        let g = grid(&["   ", "   "], &[]);
        // Centred on tile 1.
        assert_eq!(actor_origin(12.0, 4.0, &g), Some((2, 0)));
        // Halfway between tiles 1 and 2.
        assert_eq!(actor_origin(16.0, 12.0, &g), Some((3, 1)));
        // Clamped at the edges.
        assert_eq!(actor_origin(0.5, 4.0, &g), Some((0, 0)));
        assert_eq!(actor_origin(23.5, 4.0, &g), Some((4, 0)));
        assert_eq!(actor_origin(4.0, 16.5, &g), None);
    }
}
