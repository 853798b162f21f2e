//! On-screen surface routing host input into a GUI context.

use glam::{Affine2, Vec2};
use imhost_core::{
    CanvasSizeInfo, ContextIndex, ContextRegistry, HostGeometry, InputQueue, MouseCursor, Result,
    Settings,
};

use crate::events::{
    AnalogInputEvent, CharacterEvent, FocusEvent, KeyEvent, PointerEvent, Reply,
};
use crate::factory::{BoundHandler, HandlerId, InputHandlerFactory};
use crate::handler::InputHandler;
use crate::strategy::{SurfaceKind, SurfaceStrategy};

/// How the surface takes part in host hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Receives pointer input and occludes widgets beneath it.
    Visible,
    /// Drawn, but pointer input goes to whatever is beneath it.
    HitTestInvisible,
}

/// Initial input policy for a surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceConfig {
    pub handler_class: Option<String>,
    pub input_enabled: bool,
    pub hide_mouse_cursor: bool,
    pub transparent_mouse_input: bool,
    pub canvas_size: CanvasSizeInfo,
    /// Desktop size in pixels, used by desktop-sized canvases.
    pub desktop_size: Vec2,
}

impl From<&Settings> for SurfaceConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            handler_class: settings.input_handler_class.clone(),
            input_enabled: false,
            hide_mouse_cursor: settings.hide_mouse_cursor,
            transparent_mouse_input: settings.transparent_mouse_input,
            canvas_size: settings.canvas_size,
            desktop_size: Vec2::ZERO,
        }
    }
}

/// Routes host events for one surface to its input handler.
///
/// The surface never interprets events: keyboard, mouse, touch and focus
/// events go to the bound handler, which queues them on the target context.
/// Pointer positions are mapped into GUI logical space first.
pub struct InputSurface<S: SurfaceStrategy> {
    strategy: S,
    context_index: ContextIndex,
    gui_transform: Affine2,
    input_enabled: bool,
    hide_mouse_cursor: bool,
    transparent_mouse_input: bool,
    visibility: Visibility,
    cursor: MouseCursor,
    dpi_scale: f32,
    min_canvas_size: Vec2,
    adaptive_canvas_size: bool,
    canvas_size: Vec2,
    canvas_size_dirty: bool,
    handler: Option<BoundHandler>,
}

impl<S: SurfaceStrategy> InputSurface<S> {
    /// Creates a surface and its input handler.
    ///
    /// If the handler cannot be created the surface still works but drops all
    /// input. Fails if `base_index` maps outside the context index range.
    pub fn new(
        strategy: S,
        base_index: ContextIndex,
        factory: &InputHandlerFactory,
        config: &SurfaceConfig,
    ) -> Result<Self> {
        let context_index = strategy.context_index(base_index)?;
        let handler = strategy.create_input_handler(
            factory,
            config.handler_class.as_deref(),
            context_index,
        );

        let mut surface = Self {
            strategy,
            context_index,
            gui_transform: Affine2::IDENTITY,
            input_enabled: config.input_enabled,
            hide_mouse_cursor: config.hide_mouse_cursor,
            transparent_mouse_input: config.transparent_mouse_input,
            visibility: Visibility::HitTestInvisible,
            cursor: MouseCursor::None,
            dpi_scale: 1.0,
            min_canvas_size: Vec2::ZERO,
            adaptive_canvas_size: true,
            canvas_size: Vec2::ZERO,
            canvas_size_dirty: true,
            handler,
        };
        surface.update_visibility();
        surface.set_canvas_size_info(&config.canvas_size, config.desktop_size);
        Ok(surface)
    }

    /// Whether this is a runtime or an editor surface.
    pub fn kind(&self) -> SurfaceKind {
        self.strategy.kind()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Registry index of the context this surface targets.
    pub fn context_index(&self) -> ContextIndex {
        self.context_index
    }

    /// Returns true while a handler is bound. Without one all input is dropped.
    pub fn has_input_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn input_handler_id(&self) -> Option<HandlerId> {
        self.handler.as_ref().map(BoundHandler::id)
    }

    pub fn input_handler_class(&self) -> Option<&str> {
        self.handler.as_ref().map(BoundHandler::class_name)
    }

    // -- Input policy --------------------------------------------------------

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Enables or disables input and recomputes visibility.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled != enabled {
            self.input_enabled = enabled;
            self.update_visibility();
        }
    }

    pub fn is_transparent_mouse_input(&self) -> bool {
        self.transparent_mouse_input
    }

    /// Lets pointer input through to whatever is beneath the surface and
    /// recomputes visibility.
    pub fn set_transparent_mouse_input(&mut self, transparent: bool) {
        if self.transparent_mouse_input != transparent {
            self.transparent_mouse_input = transparent;
            self.update_visibility();
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Only surfaces with input enabled take keyboard focus.
    pub fn supports_keyboard_focus(&self) -> bool {
        self.input_enabled
    }

    fn update_visibility(&mut self) {
        self.visibility = if self.input_enabled && !self.transparent_mouse_input {
            Visibility::Visible
        } else {
            Visibility::HitTestInvisible
        };
        log::trace!(
            "surface {} - visibility updated to {:?}",
            self.context_index,
            self.visibility
        );
    }

    // -- Cursor --------------------------------------------------------------

    /// Cursor the host should show over this surface.
    pub fn cursor(&self) -> MouseCursor {
        self.cursor
    }

    pub fn is_mouse_cursor_hidden(&self) -> bool {
        self.hide_mouse_cursor
    }

    /// Hides or shows the host cursor and refreshes [`InputSurface::cursor`].
    pub fn set_hide_mouse_cursor(&mut self, hide: bool, registry: &ContextRegistry) {
        if self.hide_mouse_cursor != hide {
            self.hide_mouse_cursor = hide;
            self.update_mouse_cursor(registry);
        }
    }

    /// Takes the cursor from the target context unless the cursor is hidden.
    pub fn update_mouse_cursor(&mut self, registry: &ContextRegistry) {
        self.cursor = if self.hide_mouse_cursor {
            MouseCursor::None
        } else {
            registry
                .get(self.context_index)
                .map_or(MouseCursor::Default, imhost_core::GuiContext::mouse_cursor)
        };
    }

    // -- Coordinates ---------------------------------------------------------

    /// Transform from GUI logical space to surface-local space.
    pub fn gui_transform(&self) -> Affine2 {
        self.gui_transform
    }

    /// Replaces the GUI transform. [`InputSurface::set_dpi_scale`] overwrites it.
    pub fn set_gui_transform(&mut self, transform: Affine2) {
        self.gui_transform = transform;
    }

    /// Scales GUI content uniformly. Ignored by surfaces that do not apply DPI scale.
    pub fn set_dpi_scale(&mut self, scale: f32) {
        if !self.strategy.applies_dpi_scale() {
            log::trace!("surface {} ignores DPI scale", self.context_index);
            return;
        }
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        self.gui_transform = Affine2::from_scale(Vec2::splat(scale));
        self.dpi_scale = scale;
        self.canvas_size_dirty = true;
    }

    /// Maps a screen-space point into the context's logical space.
    pub fn transform_screen_point_to_gui(&self, geometry: &HostGeometry, point: Vec2) -> Vec2 {
        geometry.screen_to_gui(self.gui_transform, point)
    }

    // -- Canvas --------------------------------------------------------------

    /// Canvas size in pixels from the last [`InputSurface::update_canvas_size`].
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    /// Applies canvas settings. Takes effect on the next canvas update.
    ///
    /// Surfaces that follow their own size ignore `info`.
    pub fn set_canvas_size_info(&mut self, info: &CanvasSizeInfo, desktop_size: Vec2) {
        if self.strategy.follows_surface_size() {
            self.min_canvas_size = Vec2::ZERO;
            self.adaptive_canvas_size = true;
        } else {
            self.min_canvas_size = info.min_canvas_size(desktop_size);
            self.adaptive_canvas_size = info.is_adaptive();
        }
        self.canvas_size_dirty = true;
    }

    /// Sizes the canvas and pushes it to the context as its display size.
    ///
    /// Call once per frame with the size the surface is drawn at. A fixed
    /// canvas is pushed once; an adaptive one is recomputed every call. The
    /// display size is in GUI logical units, i.e. the canvas divided by the
    /// DPI scale.
    pub fn update_canvas_size(&mut self, registry: &mut ContextRegistry, surface_size: Vec2) {
        if !self.canvas_size_dirty {
            return;
        }
        let Some(context) = registry.get_mut(self.context_index) else {
            return;
        };

        let mut size = self.min_canvas_size;
        if self.adaptive_canvas_size {
            size = size.max(surface_size);
        } else {
            self.canvas_size_dirty = false;
        }

        if size != self.canvas_size {
            log::trace!("surface {} - canvas size {size}", self.context_index);
        }
        self.canvas_size = size;
        context.set_display_size(size / self.dpi_scale);
    }

    /// Feeds the host cursor into the context while mouse input is transparent.
    ///
    /// A transparent surface is invisible to hit-testing and receives no
    /// pointer events, so the host calls this once per frame instead. Nothing
    /// is sent while another widget holds mouse capture.
    pub fn update_transparent_mouse_input(
        &mut self,
        registry: &mut ContextRegistry,
        geometry: &HostGeometry,
        cursor_screen_position: Vec2,
        host_has_mouse_capture: bool,
    ) -> Reply {
        if !self.input_enabled || !self.transparent_mouse_input || host_has_mouse_capture {
            return Reply::unhandled();
        }
        let event = PointerEvent::at(cursor_screen_position);
        let position = self.transform_screen_point_to_gui(geometry, cursor_screen_position);
        self.forward(registry, "transparent mouse move", |h, q| {
            h.on_mouse_move(q, position, &event)
        })
    }

    // -- Handler lifetime ----------------------------------------------------

    /// Replaces the handler, e.g. after the configured handler class changed.
    pub fn recreate_input_handler(&mut self, factory: &InputHandlerFactory, class: Option<&str>) {
        self.release_input_handler();
        self.handler = self
            .strategy
            .create_input_handler(factory, class, self.context_index);
    }

    /// Unroots and drops the handler. Calling it again does nothing.
    pub fn release_input_handler(&mut self) {
        InputHandlerFactory::release_handler(self.handler.take());
    }

    fn forward<F>(&mut self, registry: &mut ContextRegistry, what: &str, f: F) -> Reply
    where
        F: FnOnce(&mut dyn InputHandler, &mut InputQueue) -> Reply,
    {
        let Some(bound) = self.handler.as_mut() else {
            log::trace!("surface {} has no input handler, dropping {what}", self.context_index);
            return Reply::unhandled();
        };
        let Some(context) = registry.get_mut(self.context_index) else {
            log::trace!("surface {} has no context, dropping {what}", self.context_index);
            return Reply::unhandled();
        };
        f(bound.handler_mut(), context.input_queue_mut())
    }

    // -- Events --------------------------------------------------------------

    /// Forwards a typed character.
    pub fn on_key_char(&mut self, registry: &mut ContextRegistry, event: &CharacterEvent) -> Reply {
        self.forward(registry, "key char", |h, q| h.on_key_char(q, event))
    }

    pub fn on_key_down(&mut self, registry: &mut ContextRegistry, event: &KeyEvent) -> Reply {
        self.forward(registry, "key down", |h, q| h.on_key_down(q, event))
    }

    pub fn on_key_up(&mut self, registry: &mut ContextRegistry, event: &KeyEvent) -> Reply {
        self.forward(registry, "key up", |h, q| h.on_key_up(q, event))
    }

    pub fn on_analog_value_changed(
        &mut self,
        registry: &mut ContextRegistry,
        event: &AnalogInputEvent,
    ) -> Reply {
        self.forward(registry, "analog value", |h, q| {
            h.on_analog_value_changed(q, event)
        })
    }

    pub fn on_mouse_button_down(
        &mut self,
        registry: &mut ContextRegistry,
        event: &PointerEvent,
    ) -> Reply {
        self.forward(registry, "mouse down", |h, q| h.on_mouse_button_down(q, event))
    }

    pub fn on_mouse_button_double_click(
        &mut self,
        registry: &mut ContextRegistry,
        event: &PointerEvent,
    ) -> Reply {
        self.forward(registry, "double click", |h, q| {
            h.on_mouse_button_double_click(q, event)
        })
    }

    /// Always asks the host to release mouse capture.
    pub fn on_mouse_button_up(
        &mut self,
        registry: &mut ContextRegistry,
        event: &PointerEvent,
    ) -> Reply {
        self.forward(registry, "mouse up", |h, q| h.on_mouse_button_up(q, event))
            .release_mouse_lock()
    }

    /// Forwards wheel movement in lines.
    pub fn on_mouse_wheel(&mut self, registry: &mut ContextRegistry, event: &PointerEvent) -> Reply {
        self.forward(registry, "mouse wheel", |h, q| h.on_mouse_wheel(q, event))
    }

    /// Maps the pointer into GUI space, then forwards it.
    pub fn on_mouse_move(
        &mut self,
        registry: &mut ContextRegistry,
        geometry: &HostGeometry,
        event: &PointerEvent,
    ) -> Reply {
        let position = self.transform_screen_point_to_gui(geometry, event.screen_position);
        self.forward(registry, "mouse move", |h, q| h.on_mouse_move(q, position, event))
    }

    /// Mouse input is enabled purely by the pointer entering the surface.
    pub fn on_mouse_enter(&mut self, registry: &mut ContextRegistry) {
        log::trace!("surface {} - mouse enter", self.context_index);
        self.forward(registry, "mouse enter", |h, q| {
            h.on_mouse_input_enabled(q);
            Reply::handled()
        });
    }

    pub fn on_mouse_leave(&mut self, registry: &mut ContextRegistry) {
        log::trace!("surface {} - mouse leave", self.context_index);
        self.forward(registry, "mouse leave", |h, q| {
            h.on_mouse_input_disabled(q);
            Reply::handled()
        });
    }

    /// Enables keyboard and gamepad input; mouse state is left alone.
    pub fn on_focus_received(&mut self, registry: &mut ContextRegistry, event: &FocusEvent) -> Reply {
        log::trace!("surface {} - focus received ({:?})", self.context_index, event.cause);
        self.forward(registry, "focus received", |h, q| {
            h.on_keyboard_input_enabled(q);
            h.on_gamepad_input_enabled(q);
            Reply::handled()
        });
        Reply::handled().reset_pointer_input()
    }

    pub fn on_focus_lost(&mut self, registry: &mut ContextRegistry, event: &FocusEvent) {
        log::trace!("surface {} - focus lost ({:?})", self.context_index, event.cause);
        self.forward(registry, "focus lost", |h, q| {
            h.on_keyboard_input_disabled(q);
            h.on_gamepad_input_disabled(q);
            Reply::handled()
        });
    }

    /// Touch positions are mapped into GUI space like mouse moves.
    pub fn on_touch_started(
        &mut self,
        registry: &mut ContextRegistry,
        geometry: &HostGeometry,
        event: &PointerEvent,
    ) -> Reply {
        let position = self.transform_screen_point_to_gui(geometry, event.screen_position);
        self.forward(registry, "touch start", |h, q| h.on_touch_started(q, position, event))
    }

    pub fn on_touch_moved(
        &mut self,
        registry: &mut ContextRegistry,
        geometry: &HostGeometry,
        event: &PointerEvent,
    ) -> Reply {
        let position = self.transform_screen_point_to_gui(geometry, event.screen_position);
        self.forward(registry, "touch move", |h, q| h.on_touch_moved(q, position, event))
    }

    /// Recomputes visibility before forwarding, since touch may have changed hit-testing.
    pub fn on_touch_ended(
        &mut self,
        registry: &mut ContextRegistry,
        geometry: &HostGeometry,
        event: &PointerEvent,
    ) -> Reply {
        self.update_visibility();
        let position = self.transform_screen_point_to_gui(geometry, event.screen_position);
        self.forward(registry, "touch end", |h, q| h.on_touch_ended(q, position, event))
    }
}

impl<S: SurfaceStrategy> Drop for InputSurface<S> {
    fn drop(&mut self) {
        self.release_input_handler();
    }
}

impl<S: SurfaceStrategy> std::fmt::Debug for InputSurface<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSurface")
            .field("kind", &self.strategy.kind())
            .field("context_index", &self.context_index)
            .field("input_enabled", &self.input_enabled)
            .field("visibility", &self.visibility)
            .field("canvas_size", &self.canvas_size)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::HandlerOuter;
    use crate::strategy::{EditorStrategy, RuntimeStrategy};
    use crate::events::AnalogInputEvent;
    use imhost_core::{
        CanvasSizeType, GamepadAxis, InputEvent, InputModality, MouseButton, OwnerKey,
        EDITOR_WINDOW_CONTEXT_INDEX_OFFSET,
    };
    use std::rc::Rc;

    fn runtime_surface(
        viewport: &Rc<HandlerOuter>,
        index: ContextIndex,
    ) -> InputSurface<RuntimeStrategy> {
        let config = SurfaceConfig {
            input_enabled: true,
            ..SurfaceConfig::default()
        };
        InputSurface::new(
            RuntimeStrategy::new(Rc::clone(viewport)),
            index,
            &InputHandlerFactory::new(),
            &config,
        )
        .unwrap()
    }

    fn queued(registry: &ContextRegistry, index: ContextIndex) -> Vec<InputEvent> {
        registry
            .get(index)
            .map(|c| c.input_queue().iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_visibility_policy() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut surface = runtime_surface(&viewport, 0);
        assert_eq!(surface.visibility(), Visibility::Visible);

        surface.set_transparent_mouse_input(true);
        assert_eq!(surface.visibility(), Visibility::HitTestInvisible);

        surface.set_input_enabled(false);
        assert_eq!(surface.visibility(), Visibility::HitTestInvisible);

        surface.set_transparent_mouse_input(false);
        assert_eq!(surface.visibility(), Visibility::HitTestInvisible);
        assert!(!surface.supports_keyboard_focus());

        surface.set_input_enabled(true);
        assert_eq!(surface.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_mouse_move_is_mapped_into_gui_space() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Simulation(0)).unwrap();
        let index = OwnerKey::Simulation(0).index().unwrap();

        let mut surface = runtime_surface(&viewport, index);
        surface.set_dpi_scale(2.0);
        let geometry = HostGeometry::new(
            Vec2::new(800.0, 600.0),
            Affine2::from_translation(Vec2::new(100.0, 50.0)),
        );

        let reply = surface.on_mouse_move(
            &mut registry,
            &geometry,
            &PointerEvent::at(Vec2::new(140.0, 90.0)),
        );
        assert!(reply.is_handled());
        assert_eq!(
            queued(&registry, index),
            vec![InputEvent::MouseMove(Vec2::new(20.0, 20.0))]
        );
    }

    #[test]
    fn test_missing_context_is_unhandled() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        let mut surface = runtime_surface(&viewport, 7);

        let event = PointerEvent::at(Vec2::ZERO).with_button(MouseButton::Left);
        assert!(!surface.on_mouse_button_down(&mut registry, &event).handled);
        assert!(!surface
            .on_key_down(&mut registry, &KeyEvent::new(imhost_core::Key::A))
            .handled);
    }

    #[test]
    fn test_mouse_up_releases_mouse_lock() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        let event = PointerEvent::at(Vec2::ZERO).with_button(MouseButton::Right);
        let reply = surface.on_mouse_button_up(&mut registry, &event);
        assert!(reply.handled);
        assert!(reply.release_mouse_lock);
    }

    #[test]
    fn test_focus_toggles_keyboard_and_gamepad_only() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        let reply = surface.on_focus_received(&mut registry, &FocusEvent::default());
        assert!(reply.handled);
        assert!(reply.reset_pointer_input);
        surface.on_focus_lost(&mut registry, &FocusEvent::default());

        let modalities: Vec<_> = queued(&registry, 0)
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Modality { modality, enabled } => Some((modality, enabled)),
                _ => None,
            })
            .collect();
        assert_eq!(
            modalities,
            vec![
                (InputModality::Keyboard, true),
                (InputModality::Gamepad, true),
                (InputModality::Keyboard, false),
                (InputModality::Gamepad, false),
            ]
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut surface = runtime_surface(&viewport, 0);
        assert_eq!(viewport.rooted_count(), 1);

        surface.release_input_handler();
        assert_eq!(viewport.rooted_count(), 0);
        assert!(!surface.has_input_handler());

        surface.release_input_handler();
        drop(surface);
        assert_eq!(viewport.rooted_count(), 0);
    }

    #[test]
    fn test_recreate_replaces_handler() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut surface = runtime_surface(&viewport, 0);
        let first = surface.input_handler_id().unwrap();

        surface.recreate_input_handler(&InputHandlerFactory::new(), None);
        let second = surface.input_handler_id().unwrap();
        assert_ne!(first, second);
        assert!(!viewport.is_rooted(first));
        assert!(viewport.is_rooted(second));
    }

    #[test]
    fn test_cursor_policy() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        surface.update_mouse_cursor(&registry);
        assert_eq!(surface.cursor(), MouseCursor::Default);

        registry.get_or_create(OwnerKey::Editor).unwrap();
        registry.tick(0.016);
        surface.set_hide_mouse_cursor(true, &registry);
        assert_eq!(surface.cursor(), MouseCursor::None);

        surface.set_hide_mouse_cursor(false, &registry);
        assert_eq!(surface.cursor(), registry.get(0).unwrap().mouse_cursor());
    }

    #[test]
    fn test_editor_surface_targets_offset_index_and_ignores_dpi() {
        let mut surface = InputSurface::new(
            EditorStrategy::new(),
            3,
            &InputHandlerFactory::new(),
            &SurfaceConfig::default(),
        )
        .unwrap();
        assert_eq!(surface.kind(), SurfaceKind::Editor);
        assert_eq!(surface.context_index(), EDITOR_WINDOW_CONTEXT_INDEX_OFFSET + 3);
        assert_eq!(surface.visibility(), Visibility::HitTestInvisible);

        surface.set_dpi_scale(2.0);
        assert_eq!(surface.gui_transform(), Affine2::IDENTITY);
    }

    #[test]
    fn test_refused_allocation_disables_routing() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        viewport.set_accepts_allocations(false);
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        assert!(!surface.has_input_handler());
        assert!(!surface
            .on_key_char(&mut registry, &CharacterEvent::new('x'))
            .handled);
        assert!(queued(&registry, 0).is_empty());
    }

    #[test]
    fn test_editor_surface_rejects_negative_slot() {
        let result = InputSurface::new(
            EditorStrategy::new(),
            -1,
            &InputHandlerFactory::new(),
            &SurfaceConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_touch_positions_are_mapped_into_gui_space() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);
        surface.set_dpi_scale(2.0);
        let geometry = HostGeometry::new(
            Vec2::new(800.0, 600.0),
            Affine2::from_translation(Vec2::new(10.0, 20.0)),
        );

        let touch = |x, y| PointerEvent::at(Vec2::new(x, y)).with_pointer_index(1);
        assert!(surface.on_touch_started(&mut registry, &geometry, &touch(30.0, 40.0)).handled);
        assert!(surface.on_touch_moved(&mut registry, &geometry, &touch(50.0, 60.0)).handled);
        assert!(surface.on_touch_ended(&mut registry, &geometry, &touch(70.0, 80.0)).handled);

        assert_eq!(
            queued(&registry, 0),
            vec![
                InputEvent::TouchStarted(Vec2::new(10.0, 10.0)),
                InputEvent::TouchMoved(Vec2::new(20.0, 20.0)),
                InputEvent::TouchEnded(Vec2::new(30.0, 30.0)),
            ]
        );
    }

    #[test]
    fn test_touch_end_recomputes_stale_visibility() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        surface.visibility = Visibility::HitTestInvisible;
        surface.on_touch_ended(&mut registry, &HostGeometry::default(), &PointerEvent::at(Vec2::ZERO));
        assert_eq!(surface.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_wheel_double_click_and_analog_are_forwarded() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);

        let wheel = PointerEvent::at(Vec2::ZERO).with_wheel_delta(-2.0);
        assert!(surface.on_mouse_wheel(&mut registry, &wheel).handled);

        let click = PointerEvent::at(Vec2::ZERO).with_button(MouseButton::Left);
        assert!(surface.on_mouse_button_double_click(&mut registry, &click).handled);
        assert!(!surface
            .on_mouse_button_double_click(&mut registry, &PointerEvent::at(Vec2::ZERO))
            .handled);

        let stick = AnalogInputEvent {
            axis: GamepadAxis::LeftStickX,
            value: 0.5,
        };
        assert!(surface.on_analog_value_changed(&mut registry, &stick).handled);

        assert_eq!(
            queued(&registry, 0),
            vec![
                InputEvent::MouseWheel(-2.0),
                InputEvent::MouseButtonDown {
                    button: MouseButton::Left,
                    double_click: true,
                },
                InputEvent::AnalogValue {
                    axis: GamepadAxis::LeftStickX,
                    value: 0.5,
                },
            ]
        );
    }

    #[test]
    fn test_adaptive_canvas_tracks_surface_size() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);
        surface.set_dpi_scale(2.0);
        surface.set_canvas_size_info(&CanvasSizeInfo::default(), Vec2::new(1920.0, 1080.0));

        surface.update_canvas_size(&mut registry, Vec2::new(800.0, 600.0));
        assert_eq!(surface.canvas_size(), Vec2::new(1920.0, 1080.0));
        assert_eq!(registry.get(0).unwrap().display_size(), Vec2::new(960.0, 540.0));

        surface.update_canvas_size(&mut registry, Vec2::new(2560.0, 1440.0));
        assert_eq!(surface.canvas_size(), Vec2::new(2560.0, 1440.0));
        assert_eq!(registry.get(0).unwrap().display_size(), Vec2::new(1280.0, 720.0));
    }

    #[test]
    fn test_fixed_canvas_is_pushed_once() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        let mut surface = runtime_surface(&viewport, 0);
        let fixed = CanvasSizeInfo {
            size_type: CanvasSizeType::Custom,
            width: 640,
            height: 480,
            extend_to_viewport: false,
        };
        surface.set_canvas_size_info(&fixed, Vec2::ZERO);

        // Nothing to size yet; the update is retried once the context exists.
        surface.update_canvas_size(&mut registry, Vec2::new(100.0, 100.0));
        assert_eq!(surface.canvas_size(), Vec2::ZERO);

        registry.get_or_create(OwnerKey::Editor).unwrap();
        surface.update_canvas_size(&mut registry, Vec2::new(1000.0, 1000.0));
        assert_eq!(registry.get(0).unwrap().display_size(), Vec2::new(640.0, 480.0));

        registry.get_mut(0).unwrap().set_display_size(Vec2::ONE);
        surface.update_canvas_size(&mut registry, Vec2::new(1000.0, 1000.0));
        assert_eq!(registry.get(0).unwrap().display_size(), Vec2::ONE);
    }

    #[test]
    fn test_editor_canvas_follows_surface() {
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::EditorWindow(0)).unwrap();
        let config = SurfaceConfig {
            canvas_size: CanvasSizeInfo {
                size_type: CanvasSizeType::Custom,
                width: 4000,
                height: 4000,
                extend_to_viewport: false,
            },
            ..SurfaceConfig::default()
        };
        let mut surface =
            InputSurface::new(EditorStrategy::new(), 0, &InputHandlerFactory::new(), &config)
                .unwrap();

        surface.update_canvas_size(&mut registry, Vec2::new(300.0, 200.0));
        let index = surface.context_index();
        assert_eq!(registry.get(index).unwrap().display_size(), Vec2::new(300.0, 200.0));
    }

    #[test]
    fn test_transparent_surface_is_fed_the_cursor() {
        let viewport = HandlerOuter::game_viewport("Viewport");
        let mut registry = ContextRegistry::new().unwrap();
        registry.get_or_create(OwnerKey::Editor).unwrap();
        let mut surface = runtime_surface(&viewport, 0);
        let geometry = HostGeometry::new(
            Vec2::new(800.0, 600.0),
            Affine2::from_translation(Vec2::new(100.0, 0.0)),
        );
        let cursor = Vec2::new(150.0, 40.0);

        assert!(!surface
            .update_transparent_mouse_input(&mut registry, &geometry, cursor, false)
            .handled);

        surface.set_transparent_mouse_input(true);
        assert!(!surface
            .update_transparent_mouse_input(&mut registry, &geometry, cursor, true)
            .handled);
        assert!(surface
            .update_transparent_mouse_input(&mut registry, &geometry, cursor, false)
            .handled);

        assert_eq!(
            queued(&registry, 0),
            vec![InputEvent::MouseMove(Vec2::new(50.0, 40.0))]
        );
    }

    proptest::proptest! {
        #[test]
        fn test_screen_point_round_trips(
            dpi in 0.5f32..4.0,
            angle in -3.1f32..3.1,
            scale in 0.25f32..4.0,
            tx in -500.0f32..500.0,
            ty in -500.0f32..500.0,
            px in -1000.0f32..1000.0,
            py in -1000.0f32..1000.0,
        ) {
            let viewport = HandlerOuter::game_viewport("Viewport");
            let mut surface = runtime_surface(&viewport, 0);
            surface.set_dpi_scale(dpi);
            let geometry = HostGeometry::new(
                Vec2::new(640.0, 480.0),
                Affine2::from_scale_angle_translation(Vec2::splat(scale), angle, Vec2::new(tx, ty)),
            );

            let gui = Vec2::new(px, py);
            let screen = geometry.gui_to_screen(surface.gui_transform()).transform_point2(gui);
            let back = surface.transform_screen_point_to_gui(&geometry, screen);
            proptest::prop_assert!((back - gui).length() < 1e-2 * (1.0 + gui.length()));
        }
    }
}
