//! Raw event payloads delivered by the host, and the reply returned for them.

use glam::Vec2;
use imhost_core::{GamepadAxis, Key, Modifiers, MouseButton};

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }
}

/// A typed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEvent {
    pub character: char,
    pub modifiers: Modifiers,
}

impl CharacterEvent {
    pub fn new(character: char) -> Self {
        Self {
            character,
            modifiers: Modifiers::default(),
        }
    }
}

/// Mouse or touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position in host screen space.
    pub screen_position: Vec2,
    /// Button that changed state, for button events.
    pub effecting_button: Option<MouseButton>,
    /// Vertical wheel movement in lines, for wheel events.
    pub wheel_delta: f32,
    /// Finger index for touch events.
    pub pointer_index: u32,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(screen_position: Vec2) -> Self {
        Self {
            screen_position,
            effecting_button: None,
            wheel_delta: 0.0,
            pointer_index: 0,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.effecting_button = Some(button);
        self
    }

    #[must_use]
    pub fn with_wheel_delta(mut self, delta: f32) -> Self {
        self.wheel_delta = delta;
        self
    }

    #[must_use]
    pub fn with_pointer_index(mut self, index: u32) -> Self {
        self.pointer_index = index;
        self
    }
}

/// Gamepad axis movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogInputEvent {
    pub axis: GamepadAxis,
    pub value: f32,
}

/// Why focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusCause {
    #[default]
    Mouse,
    Navigation,
    SetDirectly,
    Cleared,
    WindowActivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusEvent {
    pub cause: FocusCause,
}

/// Result of routing one event, with follow-up requests for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reply {
    pub handled: bool,
    /// Host should release any mouse capture held by the surface.
    pub release_mouse_lock: bool,
    /// Host should drop pointer input settings forced by an earlier interaction.
    pub reset_pointer_input: bool,
}

impl Reply {
    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Default::default()
        }
    }

    pub fn unhandled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn release_mouse_lock(mut self) -> Self {
        self.release_mouse_lock = true;
        self
    }

    #[must_use]
    pub fn reset_pointer_input(mut self) -> Self {
        self.reset_pointer_input = true;
        self
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }
}
