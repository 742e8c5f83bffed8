/// Keyboard adapter.
///
/// Tracks which keys are currently held down, enabling:
///   - Running and climbing while a key is held
///   - Edge-triggered jump (only fires on the initial press)
///
/// Uses Release events when the terminal reports them. Otherwise a key
/// counts as released once no Press/Repeat has arrived for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use ninja_thief::domain::input::{Button, FrameInput};

use super::{Commands, InputSource};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const JUMP: &[KeyCode] = &[
    KeyCode::Char(' '),
    KeyCode::Char('z'), KeyCode::Char('Z'),
    KeyCode::Char('k'), KeyCode::Char('K'),
];
const RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];

pub struct KeyboardInput {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl KeyboardInput {
    pub fn new() -> Self {
        KeyboardInput {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Ask the terminal for Release events. Call after raw mode is on.
    pub fn enable_enhancement(&mut self) {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            log::info!("keyboard enhancement unsupported; using hold timeout");
            return;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        match execute!(std::io::stdout(), PushKeyboardEnhancementFlags(flags)) {
            Ok(()) => self.honor_release = true,
            Err(e) => log::warn!("keyboard enhancement failed: {e}"),
        }
    }

    pub fn disable_enhancement(&mut self) {
        if self.honor_release {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
            self.honor_release = false;
        }
    }

    /// Drain all pending terminal events and update key states.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unreliable without enhancement; the timeout handles it.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    fn snapshot(&self) -> FrameInput {
        let mut input = FrameInput::none();
        for (button, keys) in [
            (Button::Left, LEFT),
            (Button::Right, RIGHT),
            (Button::Up, UP),
            (Button::Down, DOWN),
            (Button::Jump, JUMP),
        ] {
            input.set(button, self.any_held(keys), self.any_pressed(keys));
        }
        input
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> FrameInput {
        self.drain_events();
        self.snapshot()
    }

    fn commands(&self) -> Commands {
        Commands {
            restart: self.any_pressed(RESTART),
            quit: self.any_pressed(&[KeyCode::Esc]) || self.ctrl_c_pressed(),
        }
    }
}
