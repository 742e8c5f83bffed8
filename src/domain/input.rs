/// Per-frame input snapshot consumed by the player controller.
///
/// Two queries per button:
///   - held:    continuous actions (running, climbing)
///   - pressed: edge-triggered actions (jump), true only on the frame
///              the button went down
///
/// Front ends implement `InputSnapshot` directly or fill a `FrameInput`.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Jump,
}

impl Button {
    pub const ALL: [Button; 5] = [Button::Left, Button::Right, Button::Up, Button::Down, Button::Jump];

    fn index(self) -> usize {
        self as usize
    }
}

pub trait InputSnapshot {
    fn is_held(&self, button: Button) -> bool;
    fn was_pressed(&self, button: Button) -> bool;
}

/// Plain-value snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    held: [bool; 5],
    pressed: [bool; 5],
}

impl FrameInput {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builder: mark a button as held.
    pub fn hold(mut self, button: Button) -> Self {
        self.held[button.index()] = true;
        self
    }

    /// Builder: mark a button as freshly pressed (and therefore held).
    pub fn press(mut self, button: Button) -> Self {
        self.held[button.index()] = true;
        self.pressed[button.index()] = true;
        self
    }

    pub fn set(&mut self, button: Button, held: bool, pressed: bool) {
        self.held[button.index()] = held || pressed;
        self.pressed[button.index()] = pressed;
    }

    /// Logical OR of two snapshots (keyboard + gamepad).
    pub fn merge(mut self, other: FrameInput) -> Self {
        for i in 0..self.held.len() {
            self.held[i] |= other.held[i];
            self.pressed[i] |= other.pressed[i];
        }
        self
    }
}

impl InputSnapshot for FrameInput {
    fn is_held(&self, button: Button) -> bool {
        self.held[button.index()]
    }

    fn was_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }
}
