/// Gamepad adapter using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Run / Climb
///   A / B                 →  Jump
///   Start                 →  Restart
///   Select                →  Quit
///
/// Without the `gamepad` feature the adapter exists but never reports input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use ninja_thief::config::GamepadConfig;
use ninja_thief::domain::input::{Button as Action, FrameInput};

use super::{Commands, InputSource};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

struct ActionMap {
    jump: Vec<Btn>,
    restart: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A, Btn::B],
            restart: vec![Btn::Start],
            quit:    vec![Btn::Select],
        }
    }
}

/// Directions fed by both the d-pad and the left stick.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

pub struct GamepadInput {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 10],
    dpad: Dirs,
    stick: Dirs,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadInput {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadInput {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. An empty or unrecognised list keeps
    /// the default for that action.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        log::warn!("unknown gamepad button name {s:?}");
                    }
                    btn
                })
                .collect()
        }
        let map = &mut self.action_map;
        for (names, slot) in [
            (&cfg.jump, &mut map.jump),
            (&cfg.restart, &mut map.restart),
            (&cfg.quit, &mut map.quit),
        ] {
            let parsed = parse_list(names);
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.derive_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => self.dpad.up.set(held),
            Button::DPadDown  => self.dpad.down.set(held),
            Button::DPadLeft  => self.dpad.left.set(held),
            Button::DPadRight => self.dpad.right.set(held),
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.buttons[btn_index(btn)].set(held);
                }
            }
        }
    }

    /// Digital stick directions from the analog axes (y grows upward).
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn derive_stick(&mut self) {
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    // ── Action queries (config-driven) ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn snapshot(&self) -> FrameInput {
        let mut input = FrameInput::none();
        let dir = |d: fn(&Dirs) -> BtnState| {
            let (a, b) = (d(&self.dpad), d(&self.stick));
            (a.held || b.held, a.just_pressed || b.just_pressed)
        };
        for (action, (held, pressed)) in [
            (Action::Left, dir(|d| d.left)),
            (Action::Right, dir(|d| d.right)),
            (Action::Up, dir(|d| d.up)),
            (Action::Down, dir(|d| d.down)),
        ] {
            input.set(action, held, pressed);
        }
        let jump = &self.action_map.jump;
        input.set(Action::Jump, self.any_held(jump), self.any_just_pressed(jump));
        input
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for d in [&mut self.dpad, &mut self.stick] {
            d.up.just_pressed = false;
            d.down.just_pressed = false;
            d.left.just_pressed = false;
            d.right.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); 10];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

impl InputSource for GamepadInput {
    fn poll(&mut self) -> FrameInput {
        self.update();
        self.snapshot()
    }

    fn commands(&self) -> Commands {
        Commands {
            restart: self.any_just_pressed(&self.action_map.restart),
            quit: self.any_just_pressed(&self.action_map.quit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninja_thief::domain::input::InputSnapshot;

    fn pad() -> GamepadInput {
        let mut gp = GamepadInput::new();
        gp.release_all();
        gp
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_only_known_names() {
        let mut gp = pad();
        gp.load_button_config(&GamepadConfig {
            jump: vec!["x".into(), "bogus".into()],
            restart: vec![],
            quit: vec!["bogus".into()],
        });
        assert_eq!(gp.action_map.jump, vec![Btn::X]);
        assert_eq!(gp.action_map.restart, vec![Btn::Start]);
        assert_eq!(gp.action_map.quit, vec![Btn::Select]);
    }

    #[test]
    fn jump_edge_then_hold() {
        let mut gp = pad();
        gp.buttons[btn_index(Btn::A)].set(true);
        let first = gp.snapshot();
        assert!(first.was_pressed(Action::Jump));

        gp.clear_just_pressed();
        gp.buttons[btn_index(Btn::A)].set(true);
        let held = gp.snapshot();
        assert!(held.is_held(Action::Jump));
        assert!(!held.was_pressed(Action::Jump));
    }

    #[test]
    fn stick_and_dpad_both_steer() {
        let mut gp = pad();
        gp.stick_x = -0.8;
        gp.derive_stick();
        gp.dpad.up.set(true);
        let input = gp.snapshot();
        assert!(input.is_held(Action::Left));
        assert!(input.is_held(Action::Up));
        assert!(!input.is_held(Action::Right));

        gp.stick_x = 0.1;
        gp.derive_stick();
        assert!(!gp.snapshot().is_held(Action::Left));
    }

    #[test]
    fn start_restarts() {
        let mut gp = pad();
        gp.buttons[btn_index(Btn::Start)].set(true);
        assert_eq!(gp.commands(), Commands { restart: true, quit: false });
    }
}
