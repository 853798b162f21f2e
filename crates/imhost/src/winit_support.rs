//! Feeds winit window events into an [`InputSurface`].

use std::time::{Duration, Instant};

use glam::Vec2;
use imhost_core::{ContextRegistry, HostGeometry, Key, Modifiers, MouseButton, MouseCursor};
use imhost_input::{
    CharacterEvent, FocusCause, FocusEvent, InputSurface, KeyEvent, PointerEvent, Reply,
    SurfaceStrategy,
};
use winit::dpi::PhysicalPosition;
use winit::event::{
    ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, Touch, TouchPhase,
    WindowEvent,
};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::CursorIcon;

/// Maximum delay between two presses for them to count as a double click.
pub const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(300);

/// Maximum pointer travel between two presses of a double click, in pixels.
pub const DOUBLE_CLICK_MAX_DISTANCE: f32 = 6.0;

/// Pixels of precise scrolling that count as one wheel line.
pub const PIXELS_PER_WHEEL_LINE: f32 = 20.0;

#[derive(Debug, Clone, Copy)]
struct LastPress {
    button: MouseButton,
    at: Instant,
    position: Vec2,
}

/// State winit does not repeat on every event.
///
/// winit 0.30 reports modifiers and the pointer position only when they
/// change, and never reports double clicks.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    modifiers: Modifiers,
    pointer_position: Option<Vec2>,
    last_press: Option<LastPress>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifier state from the last `ModifiersChanged` event.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Last known pointer position in screen space, if the pointer is over the window.
    pub fn pointer_position(&self) -> Option<Vec2> {
        self.pointer_position
    }

    /// Records a press and reports whether it completes a double click.
    pub fn register_press(&mut self, button: MouseButton, position: Vec2, now: Instant) -> bool {
        let double_click = self.last_press.is_some_and(|last| {
            last.button == button
                && now.saturating_duration_since(last.at) <= DOUBLE_CLICK_TIME
                && last.position.distance(position) <= DOUBLE_CLICK_MAX_DISTANCE
        });

        // A third press starts a new sequence rather than another double click.
        self.last_press = if double_click {
            None
        } else {
            Some(LastPress {
                button,
                at: now,
                position,
            })
        };
        double_click
    }

    fn pointer_event(&self, position: Vec2) -> PointerEvent {
        PointerEvent {
            modifiers: self.modifiers,
            ..PointerEvent::at(position)
        }
    }
}

/// Routes one winit event to `surface`.
///
/// Positions are taken in physical pixels, which is the screen space
/// `geometry` is expected to map to. Returns `None` for events the surface has
/// no entry point for.
pub fn dispatch_window_event<S: SurfaceStrategy>(
    surface: &mut InputSurface<S>,
    registry: &mut ContextRegistry,
    geometry: &HostGeometry,
    tracker: &mut InputTracker,
    event: &WindowEvent,
) -> Option<Reply> {
    match event {
        WindowEvent::ModifiersChanged(modifiers) => {
            tracker.modifiers = map_modifiers(modifiers.state());
            None
        }

        WindowEvent::Focused(true) => Some(surface.on_focus_received(
            registry,
            &FocusEvent {
                cause: FocusCause::WindowActivate,
            },
        )),

        WindowEvent::Focused(false) => {
            surface.on_focus_lost(
                registry,
                &FocusEvent {
                    cause: FocusCause::Cleared,
                },
            );
            Some(Reply::handled())
        }

        WindowEvent::CursorEntered { .. } => {
            surface.on_mouse_enter(registry);
            Some(Reply::handled())
        }

        WindowEvent::CursorLeft { .. } => {
            tracker.pointer_position = None;
            surface.on_mouse_leave(registry);
            Some(Reply::handled())
        }

        WindowEvent::CursorMoved { position, .. } => {
            let position = to_vec2(*position);
            tracker.pointer_position = Some(position);
            Some(surface.on_mouse_move(registry, geometry, &tracker.pointer_event(position)))
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let Some(button) = map_mouse_button(*button) else {
                log::trace!("ignoring unsupported mouse button {button:?}");
                return None;
            };
            let position = tracker.pointer_position.unwrap_or(Vec2::ZERO);
            let pointer = tracker.pointer_event(position).with_button(button);

            Some(match state {
                ElementState::Pressed => {
                    if tracker.register_press(button, position, Instant::now()) {
                        surface.on_mouse_button_double_click(registry, &pointer)
                    } else {
                        surface.on_mouse_button_down(registry, &pointer)
                    }
                }
                ElementState::Released => surface.on_mouse_button_up(registry, &pointer),
            })
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                #[allow(clippy::cast_possible_truncation)]
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_WHEEL_LINE,
            };
            let position = tracker.pointer_position.unwrap_or(Vec2::ZERO);
            let pointer = tracker.pointer_event(position).with_wheel_delta(lines);
            Some(surface.on_mouse_wheel(registry, &pointer))
        }

        WindowEvent::KeyboardInput { event, .. } => dispatch_key(
            surface,
            registry,
            tracker,
            event.physical_key,
            event.state,
            event.repeat,
            event.text.as_deref(),
        ),

        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => {
            Some(send_text(surface, registry, tracker.modifiers, text))
        }

        WindowEvent::Touch(touch) => {
            Some(dispatch_touch(surface, registry, geometry, tracker, touch))
        }

        _ => None,
    }
}

/// Sends a key press or release, plus the text a press produced.
fn dispatch_key<S: SurfaceStrategy>(
    surface: &mut InputSurface<S>,
    registry: &mut ContextRegistry,
    tracker: &InputTracker,
    physical_key: PhysicalKey,
    state: ElementState,
    repeat: bool,
    text: Option<&str>,
) -> Option<Reply> {
    let key_event = KeyEvent {
        key: map_key(physical_key)?,
        modifiers: tracker.modifiers,
        repeat,
    };

    match state {
        ElementState::Pressed => {
            let mut reply = surface.on_key_down(registry, &key_event);
            if let Some(text) = text {
                let typed = send_text(surface, registry, tracker.modifiers, text);
                reply.handled |= typed.handled;
            }
            Some(reply)
        }
        ElementState::Released => Some(surface.on_key_up(registry, &key_event)),
    }
}

fn dispatch_touch<S: SurfaceStrategy>(
    surface: &mut InputSurface<S>,
    registry: &mut ContextRegistry,
    geometry: &HostGeometry,
    tracker: &InputTracker,
    touch: &Touch,
) -> Reply {
    let pointer = tracker
        .pointer_event(to_vec2(touch.location))
        .with_pointer_index(u32::try_from(touch.id).unwrap_or(u32::MAX));

    match touch.phase {
        TouchPhase::Started => surface.on_touch_started(registry, geometry, &pointer),
        TouchPhase::Moved => surface.on_touch_moved(registry, geometry, &pointer),
        TouchPhase::Ended | TouchPhase::Cancelled => {
            surface.on_touch_ended(registry, geometry, &pointer)
        }
    }
}

/// Sends every printable character of `text` as a character event.
fn send_text<S: SurfaceStrategy>(
    surface: &mut InputSurface<S>,
    registry: &mut ContextRegistry,
    modifiers: Modifiers,
    text: &str,
) -> Reply {
    let mut reply = Reply::unhandled();
    for character in text.chars().filter(|c| !c.is_control()) {
        let event = CharacterEvent {
            character,
            modifiers,
        };
        reply.handled |= surface.on_key_char(registry, &event).handled;
    }
    reply
}

/// Cursor icon to show for `cursor`, or `None` when the cursor should be hidden.
pub fn cursor_icon(cursor: MouseCursor) -> Option<CursorIcon> {
    let icon = match cursor {
        MouseCursor::None => return None,
        MouseCursor::Default => CursorIcon::Default,
        MouseCursor::TextEditBeam => CursorIcon::Text,
        MouseCursor::ResizeAll => CursorIcon::Move,
        MouseCursor::ResizeNorthSouth => CursorIcon::NsResize,
        MouseCursor::ResizeEastWest => CursorIcon::EwResize,
        MouseCursor::ResizeNorthEastSouthWest => CursorIcon::NeswResize,
        MouseCursor::ResizeNorthWestSouthEast => CursorIcon::NwseResize,
        MouseCursor::Hand => CursorIcon::Pointer,
        MouseCursor::NotAllowed => CursorIcon::NotAllowed,
    };
    Some(icon)
}

#[allow(clippy::cast_possible_truncation)]
fn to_vec2(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(_) => None,
    }
}

fn map_key(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::Tab => Key::Tab,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Other(other as u32),
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imhost_core::{InputEvent, InputModality, OwnerKey};
    use imhost_input::{HandlerOuter, InputHandlerFactory, RuntimeStrategy, SurfaceConfig};
    use winit::event::{DeviceId, Modifiers as WinitModifiers};

    #[allow(unsafe_code)]
    fn device() -> DeviceId {
        // SAFETY: the id is only compared, never passed back to the platform.
        unsafe { DeviceId::dummy() }
    }

    struct Harness {
        surface: InputSurface<RuntimeStrategy>,
        registry: ContextRegistry,
        tracker: InputTracker,
        _viewport: std::rc::Rc<HandlerOuter>,
    }

    impl Harness {
        fn new() -> Self {
            let (surface, viewport) = surface();
            let mut registry = ContextRegistry::new().unwrap();
            registry.get_or_create(OwnerKey::Editor).unwrap();
            Self {
                surface,
                registry,
                tracker: InputTracker::new(),
                _viewport: viewport,
            }
        }

        fn send(&mut self, event: &WindowEvent) -> Option<Reply> {
            dispatch_window_event(
                &mut self.surface,
                &mut self.registry,
                &HostGeometry::default(),
                &mut self.tracker,
                event,
            )
        }

        fn key(&mut self, code: KeyCode, state: ElementState, text: Option<&str>) -> Option<Reply> {
            dispatch_key(
                &mut self.surface,
                &mut self.registry,
                &self.tracker,
                PhysicalKey::Code(code),
                state,
                false,
                text,
            )
        }

        fn queued(&mut self) -> Vec<InputEvent> {
            self.registry
                .get_mut(0)
                .unwrap()
                .input_queue_mut()
                .drain()
                .collect()
        }
    }

    fn touch(phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id: 3,
        })
    }

    fn surface() -> (InputSurface<RuntimeStrategy>, std::rc::Rc<HandlerOuter>) {
        let viewport = HandlerOuter::game_viewport("Window");
        let config = SurfaceConfig {
            input_enabled: true,
            ..SurfaceConfig::default()
        };
        let surface = InputSurface::new(
            RuntimeStrategy::new(std::rc::Rc::clone(&viewport)),
            0,
            &InputHandlerFactory::new(),
            &config,
        )
        .unwrap();
        (surface, viewport)
    }

    #[test]
    fn test_double_click_detection() {
        let mut tracker = InputTracker::new();
        let start = Instant::now();
        let p = Vec2::new(10.0, 10.0);

        assert!(!tracker.register_press(MouseButton::Left, p, start));
        let later = start + Duration::from_millis(100);
        assert!(tracker.register_press(MouseButton::Left, p + Vec2::ONE, later));
        assert!(!tracker.register_press(MouseButton::Left, p, start + Duration::from_millis(150)));

        assert!(!tracker.register_press(MouseButton::Right, p, start + Duration::from_secs(2)));
        assert!(!tracker.register_press(MouseButton::Right, p, start + Duration::from_secs(3)));
        assert!(!tracker.register_press(MouseButton::Left, p, start + Duration::from_millis(3100)));
    }

    #[test]
    fn test_modifiers_are_tracked() {
        let (mut surface, _viewport) = surface();
        let mut registry = ContextRegistry::new().unwrap();
        let mut tracker = InputTracker::new();

        let event = WindowEvent::ModifiersChanged(WinitModifiers::from(
            ModifiersState::SHIFT | ModifiersState::CONTROL,
        ));
        let reply = dispatch_window_event(
            &mut surface,
            &mut registry,
            &HostGeometry::default(),
            &mut tracker,
            &event,
        );
        assert!(reply.is_none());
        assert!(tracker.modifiers().shift);
        assert!(tracker.modifiers().ctrl);
        assert!(!tracker.modifiers().alt);
    }

    #[test]
    fn test_focus_events_reach_context() {
        let (mut surface, _viewport) = surface();
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut tracker = InputTracker::new();

        let reply = dispatch_window_event(
            &mut surface,
            &mut registry,
            &HostGeometry::default(),
            &mut tracker,
            &WindowEvent::Focused(true),
        )
        .unwrap();
        assert!(reply.reset_pointer_input);

        let queued: Vec<_> = registry.get(0).unwrap().input_queue().iter().cloned().collect();
        assert!(queued.contains(&InputEvent::Modality {
            modality: InputModality::Keyboard,
            enabled: true
        }));
    }

    #[test]
    fn test_cursor_moves_are_tracked_and_forwarded() {
        let mut h = Harness::new();
        let moved = WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(12.0, 34.0),
        };
        assert!(h.send(&moved).unwrap().handled);
        assert_eq!(h.tracker.pointer_position(), Some(Vec2::new(12.0, 34.0)));
        assert_eq!(h.queued(), vec![InputEvent::MouseMove(Vec2::new(12.0, 34.0))]);

        h.send(&WindowEvent::CursorLeft { device_id: device() });
        assert_eq!(h.tracker.pointer_position(), None);
    }

    #[test]
    fn test_second_quick_press_is_a_double_click() {
        let mut h = Harness::new();
        let press = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: WinitMouseButton::Left,
        };
        let release = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: WinitMouseButton::Left,
        };

        assert!(h.send(&press).unwrap().handled);
        assert!(h.send(&release).unwrap().release_mouse_lock);
        assert!(h.send(&press).unwrap().handled);

        assert_eq!(
            h.queued(),
            vec![
                InputEvent::MouseButtonDown {
                    button: MouseButton::Left,
                    double_click: false,
                },
                InputEvent::MouseButtonUp(MouseButton::Left),
                InputEvent::MouseButtonDown {
                    button: MouseButton::Left,
                    double_click: true,
                },
            ]
        );

        let other = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: WinitMouseButton::Other(8),
        };
        assert!(h.send(&other).is_none());
    }

    #[test]
    fn test_pixel_scrolling_is_converted_to_lines() {
        let mut h = Harness::new();
        let pixels = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)),
            phase: TouchPhase::Moved,
        };
        let lines = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            phase: TouchPhase::Moved,
        };
        h.send(&pixels);
        h.send(&lines);
        assert_eq!(
            h.queued(),
            vec![InputEvent::MouseWheel(2.0), InputEvent::MouseWheel(-1.0)]
        );
    }

    #[test]
    fn test_key_press_sends_printable_text() {
        let mut h = Harness::new();
        assert!(h.key(KeyCode::KeyA, ElementState::Pressed, Some("a")).unwrap().handled);
        assert!(h.key(KeyCode::Enter, ElementState::Pressed, Some("\r")).unwrap().handled);
        assert!(h.key(KeyCode::KeyA, ElementState::Released, None).unwrap().handled);

        let no_modifiers = Modifiers::default();
        assert_eq!(
            h.queued(),
            vec![
                InputEvent::KeyDown {
                    key: Key::A,
                    modifiers: no_modifiers,
                },
                InputEvent::Char('a'),
                InputEvent::KeyDown {
                    key: Key::Enter,
                    modifiers: no_modifiers,
                },
                InputEvent::KeyUp {
                    key: Key::A,
                    modifiers: no_modifiers,
                },
            ]
        );
    }

    #[test]
    fn test_ime_commit_sends_characters() {
        let mut h = Harness::new();
        assert!(h
            .send(&WindowEvent::Ime(Ime::Commit("日本".to_string())))
            .unwrap()
            .handled);
        assert!(h.send(&WindowEvent::Ime(Ime::Commit(String::new()))).is_none());
        assert_eq!(
            h.queued(),
            vec![InputEvent::Char('日'), InputEvent::Char('本')]
        );
    }

    #[test]
    fn test_touch_phases_are_routed() {
        let mut h = Harness::new();
        h.send(&touch(TouchPhase::Started, 1.0, 2.0));
        h.send(&touch(TouchPhase::Moved, 3.0, 4.0));
        h.send(&touch(TouchPhase::Cancelled, 5.0, 6.0));
        assert_eq!(
            h.queued(),
            vec![
                InputEvent::TouchStarted(Vec2::new(1.0, 2.0)),
                InputEvent::TouchMoved(Vec2::new(3.0, 4.0)),
                InputEvent::TouchEnded(Vec2::new(5.0, 6.0)),
            ]
        );
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyC)), Some(Key::C));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadEnter)), Some(Key::Enter));
        assert!(matches!(
            map_key(PhysicalKey::Code(KeyCode::KeyQ)),
            Some(Key::Other(_))
        ));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), None);
    }

    #[test]
    fn test_cursor_icons() {
        assert_eq!(cursor_icon(MouseCursor::None), None);
        assert_eq!(cursor_icon(MouseCursor::TextEditBeam), Some(CursorIcon::Text));
        assert_eq!(cursor_icon(MouseCursor::Hand), Some(CursorIcon::Pointer));
    }
}
