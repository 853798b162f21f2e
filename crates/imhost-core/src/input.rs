//! Input events queued for a context and the state they accumulate into.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of mouse buttons tracked by [`InputState`].
pub const MOUSE_BUTTON_COUNT: usize = 5;

/// Mouse buttons the GUI understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// Slot in [`InputState::mouse_down`].
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
        }
    }
}

/// Keyboard keys forwarded to the GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Tab,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    Backspace,
    Space,
    Enter,
    Escape,
    Shift,
    Control,
    Alt,
    Meta,
    A,
    C,
    V,
    X,
    Y,
    Z,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    /// Any other key, identified by the host's raw code.
    Other(u32),
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Analog gamepad inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GamepadAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

/// Input modalities that can be switched on and off independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputModality {
    Mouse,
    Keyboard,
    Gamepad,
}

/// Cursor shape a context asks the host to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseCursor {
    /// No cursor at all.
    None,
    #[default]
    Default,
    TextEditBeam,
    ResizeAll,
    ResizeNorthSouth,
    ResizeEastWest,
    ResizeNorthEastSouthWest,
    ResizeNorthWestSouthEast,
    Hand,
    NotAllowed,
}

/// One input event queued for a context.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    Char(char),
    AnalogValue { axis: GamepadAxis, value: f32 },
    MouseButtonDown { button: MouseButton, double_click: bool },
    MouseButtonUp(MouseButton),
    MouseWheel(f32),
    /// Pointer position in GUI logical space.
    MouseMove(Vec2),
    TouchStarted(Vec2),
    TouchMoved(Vec2),
    TouchEnded(Vec2),
    Modality { modality: InputModality, enabled: bool },
}

/// Events waiting for the next context update.
#[derive(Debug, Default, Clone)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

/// Input as seen by draw callbacks during one frame.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Pointer position in GUI logical space, `None` when the pointer is away.
    pub mouse_pos: Option<Vec2>,
    pub mouse_down: [bool; MOUSE_BUTTON_COUNT],
    pub mouse_double_clicked: [bool; MOUSE_BUTTON_COUNT],
    /// Wheel movement accumulated this frame.
    pub mouse_wheel: f32,
    pub keys_down: BTreeSet<Key>,
    pub modifiers: Modifiers,
    /// Characters typed this frame.
    pub input_chars: Vec<char>,
    pub analog: BTreeMap<GamepadAxis, f32>,
    pub mouse_enabled: bool,
    pub keyboard_enabled: bool,
    pub gamepad_enabled: bool,
    pub delta_time: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            mouse_pos: None,
            mouse_down: [false; MOUSE_BUTTON_COUNT],
            mouse_double_clicked: [false; MOUSE_BUTTON_COUNT],
            mouse_wheel: 0.0,
            keys_down: BTreeSet::new(),
            modifiers: Modifiers::default(),
            input_chars: Vec::new(),
            analog: BTreeMap::new(),
            mouse_enabled: false,
            keyboard_enabled: false,
            gamepad_enabled: false,
            delta_time: 0.0,
        }
    }
}

impl InputState {
    #[must_use]
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button.slot()]
    }

    #[must_use]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Clears values that only last for one frame.
    pub fn begin_frame(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.mouse_wheel = 0.0;
        self.input_chars.clear();
        self.mouse_double_clicked = [false; MOUSE_BUTTON_COUNT];
    }

    /// Folds one event into the state.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key, modifiers } => {
                if self.keyboard_enabled {
                    self.keys_down.insert(key);
                    self.modifiers = modifiers;
                }
            }
            InputEvent::KeyUp { key, modifiers } => {
                self.keys_down.remove(&key);
                self.modifiers = modifiers;
            }
            InputEvent::Char(c) => {
                if self.keyboard_enabled {
                    self.input_chars.push(c);
                }
            }
            InputEvent::AnalogValue { axis, value } => {
                if self.gamepad_enabled {
                    self.analog.insert(axis, value);
                }
            }
            InputEvent::MouseButtonDown {
                button,
                double_click,
            } => {
                let slot = button.slot();
                self.mouse_down[slot] = true;
                self.mouse_double_clicked[slot] |= double_click;
            }
            InputEvent::MouseButtonUp(button) => {
                self.mouse_down[button.slot()] = false;
            }
            InputEvent::MouseWheel(delta) => self.mouse_wheel += delta,
            InputEvent::MouseMove(pos) | InputEvent::TouchMoved(pos) => {
                self.mouse_pos = Some(pos);
            }
            InputEvent::TouchStarted(pos) => {
                self.mouse_pos = Some(pos);
                self.mouse_down[MouseButton::Left.slot()] = true;
            }
            InputEvent::TouchEnded(pos) => {
                self.mouse_pos = Some(pos);
                self.mouse_down[MouseButton::Left.slot()] = false;
            }
            InputEvent::Modality { modality, enabled } => self.set_modality(modality, enabled),
        }
    }

    fn set_modality(&mut self, modality: InputModality, enabled: bool) {
        match modality {
            InputModality::Mouse => {
                self.mouse_enabled = enabled;
                if !enabled {
                    self.mouse_pos = None;
                    self.mouse_down = [false; MOUSE_BUTTON_COUNT];
                }
            }
            InputModality::Keyboard => {
                self.keyboard_enabled = enabled;
                if !enabled {
                    self.keys_down.clear();
                    self.modifiers = Modifiers::default();
                }
            }
            InputModality::Gamepad => {
                self.gamepad_enabled = enabled;
                if !enabled {
                    self.analog.clear();
                }
            }
        }
    }
}
