//! Input handlers translate host events into GUI input events.
//!
//! Every method has a default that forwards the event into the context's
//! queue. Custom handlers override the methods they want to filter, e.g. to
//! keep a console key away from the GUI.

use glam::Vec2;
use imhost_core::{ContextIndex, InputEvent, InputModality, InputQueue};

use crate::events::{AnalogInputEvent, CharacterEvent, KeyEvent, PointerEvent, Reply};

/// Policy object turning host input into GUI input for one context.
pub trait InputHandler {
    /// Called once by the factory right after construction.
    fn initialize(&mut self, context_index: ContextIndex) {
        let _ = context_index;
    }

    fn on_key_char(&mut self, queue: &mut InputQueue, event: &CharacterEvent) -> Reply {
        queue.push(InputEvent::Char(event.character));
        Reply::handled()
    }

    fn on_key_down(&mut self, queue: &mut InputQueue, event: &KeyEvent) -> Reply {
        queue.push(InputEvent::KeyDown {
            key: event.key,
            modifiers: event.modifiers,
        });
        Reply::handled()
    }

    fn on_key_up(&mut self, queue: &mut InputQueue, event: &KeyEvent) -> Reply {
        queue.push(InputEvent::KeyUp {
            key: event.key,
            modifiers: event.modifiers,
        });
        Reply::handled()
    }

    fn on_analog_value_changed(
        &mut self,
        queue: &mut InputQueue,
        event: &AnalogInputEvent,
    ) -> Reply {
        queue.push(InputEvent::AnalogValue {
            axis: event.axis,
            value: event.value,
        });
        Reply::handled()
    }

    fn on_mouse_button_down(&mut self, queue: &mut InputQueue, event: &PointerEvent) -> Reply {
        match event.effecting_button {
            Some(button) => {
                queue.push(InputEvent::MouseButtonDown {
                    button,
                    double_click: false,
                });
                Reply::handled()
            }
            None => Reply::unhandled(),
        }
    }

    fn on_mouse_button_double_click(
        &mut self,
        queue: &mut InputQueue,
        event: &PointerEvent,
    ) -> Reply {
        match event.effecting_button {
            Some(button) => {
                queue.push(InputEvent::MouseButtonDown {
                    button,
                    double_click: true,
                });
                Reply::handled()
            }
            None => Reply::unhandled(),
        }
    }

    fn on_mouse_button_up(&mut self, queue: &mut InputQueue, event: &PointerEvent) -> Reply {
        match event.effecting_button {
            Some(button) => {
                queue.push(InputEvent::MouseButtonUp(button));
                Reply::handled()
            }
            None => Reply::unhandled(),
        }
    }

    fn on_mouse_wheel(&mut self, queue: &mut InputQueue, event: &PointerEvent) -> Reply {
        queue.push(InputEvent::MouseWheel(event.wheel_delta));
        Reply::handled()
    }

    /// `gui_position` is the pointer already mapped into GUI logical space.
    fn on_mouse_move(
        &mut self,
        queue: &mut InputQueue,
        gui_position: Vec2,
        event: &PointerEvent,
    ) -> Reply {
        let _ = event;
        queue.push(InputEvent::MouseMove(gui_position));
        Reply::handled()
    }

    fn on_touch_started(
        &mut self,
        queue: &mut InputQueue,
        gui_position: Vec2,
        event: &PointerEvent,
    ) -> Reply {
        let _ = event;
        queue.push(InputEvent::TouchStarted(gui_position));
        Reply::handled()
    }

    fn on_touch_moved(
        &mut self,
        queue: &mut InputQueue,
        gui_position: Vec2,
        event: &PointerEvent,
    ) -> Reply {
        let _ = event;
        queue.push(InputEvent::TouchMoved(gui_position));
        Reply::handled()
    }

    fn on_touch_ended(
        &mut self,
        queue: &mut InputQueue,
        gui_position: Vec2,
        event: &PointerEvent,
    ) -> Reply {
        let _ = event;
        queue.push(InputEvent::TouchEnded(gui_position));
        Reply::handled()
    }

    fn on_mouse_input_enabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Mouse, true);
    }

    fn on_mouse_input_disabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Mouse, false);
    }

    fn on_keyboard_input_enabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Keyboard, true);
    }

    fn on_keyboard_input_disabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Keyboard, false);
    }

    fn on_gamepad_input_enabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Gamepad, true);
    }

    fn on_gamepad_input_disabled(&mut self, queue: &mut InputQueue) {
        set_modality(queue, InputModality::Gamepad, false);
    }
}

fn set_modality(queue: &mut InputQueue, modality: InputModality, enabled: bool) {
    queue.push(InputEvent::Modality { modality, enabled });
}

/// Handler used when no class is configured or the configured one is unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInputHandler;

impl InputHandler for DefaultInputHandler {}
