//! imhost: immediate-mode GUI contexts hosted inside a game engine frame loop.
//!
//! The host keeps one GUI context per logical owner (the editor, a
//! standalone game, each play-in-editor instance, each editor window),
//! routes host input into those contexts and turns their draw output back
//! into screen-space draw elements.
//!
//! # Quick Start
//!
//! ```no_run
//! use imhost::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!     let mut host = Host::new(Settings::default())?;
//!
//!     let viewport = HandlerOuter::game_viewport("GameViewport");
//!     let mut surface = host.create_runtime_surface(&viewport, OwnerKey::Simulation(0))?;
//!     let geometry = HostGeometry::new(Vec2::new(1280.0, 720.0), Affine2::IDENTITY);
//!
//!     host.world_context(OwnerKey::Simulation(0))?
//!         .add_draw_callback(|frame| {
//!             frame
//!                 .draw_list("Hello")
//!                 .add_rect_filled(Vec2::ZERO, Vec2::splat(32.0), 0xffff_ffff);
//!         });
//!
//!     host.update_surface(&mut surface, &geometry);
//!     host.tick(1.0 / 60.0);
//!
//!     let elements = Painter::new().paint_registry(
//!         host.registry(),
//!         surface.context_index(),
//!         &geometry,
//!         surface.gui_transform(),
//!         Rect::everything(),
//!     )?;
//!     assert!(!elements.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `imhost-core`: registry, contexts, font atlas, geometry, settings
//! - `imhost-input`: surfaces, input handlers, the handler factory
//! - `imhost` (this crate): [`Host`], [`Painter`] and the winit adapter

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod host;
mod paint;
pub mod winit_support;

pub use host::{Host, SettingsChanges};
pub use paint::{HostDrawElement, HostVertex, PaintStats, Painter};
pub use winit_support::{cursor_icon, dispatch_window_event, InputTracker};

pub use imhost_core::{
    Affine2, AtlasId, CanvasSizeInfo, CanvasSizeType, ContextId, ContextIndex, ContextRegistry,
    DelegateHandle, DpiScaleInfo, DpiScaleMode, DrawData, DrawList, FontConfig, Frame,
    GamepadAxis, GuiContext, HostGeometry, ImHostError, InputEvent, InputQueue, Key, Liveness,
    Modifiers, MouseButton, MouseCursor, OwnerKey, Rect, Result, Settings, TextureId, Vec2,
    EDITOR_WINDOW_CONTEXT_INDEX_OFFSET, FONT_RELEASE_FRAMES, MAX_SIMULATION_INSTANCES,
};
pub use imhost_input::{
    AnalogInputEvent, BoundHandler, CharacterEvent, DefaultInputHandler, EditorStrategy,
    FocusEvent, HandlerOuter, InputHandler, InputHandlerFactory, InputSurface, KeyEvent,
    PointerEvent, Reply, RuntimeStrategy, SurfaceConfig, SurfaceKind, SurfaceStrategy, Visibility,
};

/// Sets up `env_logger` for binaries embedding imhost.
///
/// Honors `RUST_LOG`. Calling it when a logger is already installed is harmless.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
