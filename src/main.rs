/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ninja_thief::config::{candidate_dirs, GameConfig};
use ninja_thief::sim::level::LevelTable;
use ninja_thief::sim::session::Session;

use ui::gamepad::GamepadInput;
use ui::input::KeyboardInput;
use ui::renderer::Renderer;
use ui::InputSource;

const LOG_FILE: &str = "ninja-thief.log";

fn main() {
    init_logging();
    let config = GameConfig::load();

    let table = load_levels(&config);
    let mut session = match Session::new(
        table,
        config.sim.clone(),
        config.general.start_level,
        config.general.seed,
    ) {
        Ok(s) => s,
        Err(e) => {
            log::error!("cannot start: {e}");
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Ninja Thief!");
    println!("Final Score: {}", session.total_score());
}

/// Log to a file so the terminal UI is not overwritten.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match File::create(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // No writable log file: stay quiet rather than draw over the game.
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

/// The configured level pack, or the built-in levels when none is set or it fails to load.
fn load_levels(config: &GameConfig) -> LevelTable {
    if let Some(path) = config.general.levels_file.as_deref().and_then(resolve) {
        match LevelTable::load(&path) {
            Ok(table) => return table,
            Err(e) => log::warn!("{}: {e}; using built-in levels", path.display()),
        }
    } else if let Some(path) = &config.general.levels_file {
        log::warn!("level pack {} not found; using built-in levels", path.display());
    }

    match LevelTable::builtin() {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Built-in levels are broken: {e}");
            std::process::exit(1);
        }
    }
}

/// Relative paths are tried in each config search directory.
fn resolve(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    candidate_dirs()
        .into_iter()
        .map(|dir| dir.join(path))
        .find(|p| p.exists())
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = KeyboardInput::new();
    kb.enable_enhancement();
    let mut gp = GamepadInput::new();
    gp.load_button_config(&config.gamepad);

    let frame = Duration::from_millis(config.general.frame_ms);
    let mut last_tick = Instant::now();

    let result = loop {
        let input = kb.poll().merge(gp.poll());
        let commands = kb.commands().merge(gp.commands());

        if commands.quit {
            break Ok(());
        }
        if commands.restart {
            log::info!("restart requested");
            if let Err(e) = session.restart() {
                break Err(e.into());
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f32();
        last_tick = now;

        match session.tick(dt, &input) {
            Ok(events) => renderer.note_events(&events),
            Err(e) => break Err(e.into()),
        }

        if let Err(e) = renderer.render(session, gp.connected) {
            break Err(e.into());
        }
        std::thread::sleep(frame);
    };

    kb.disable_enhancement();
    result
}
