/// Terminal front end: device adapters and the renderer.
///
/// Each input device fills a `FrameInput` for the core plus the two
/// front-end commands the core never sees (restart, quit).

pub mod gamepad;
pub mod input;
pub mod renderer;

use ninja_thief::domain::input::FrameInput;

/// Requests handled by the game loop rather than the simulation.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Commands {
    pub restart: bool,
    pub quit: bool,
}

impl Commands {
    pub fn merge(self, other: Commands) -> Commands {
        Commands {
            restart: self.restart || other.restart,
            quit: self.quit || other.quit,
        }
    }
}

pub trait InputSource {
    /// Read pending device events. Call once per frame.
    fn poll(&mut self) -> FrameInput;

    /// Commands seen by the most recent `poll`.
    fn commands(&self) -> Commands;
}
