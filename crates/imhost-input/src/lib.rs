//! Input routing for imhost.
//!
//! An [`InputSurface`] receives host events for one on-screen surface and
//! forwards them to an [`InputHandler`], which queues them on the target
//! context. How the handler is created and which context the surface targets
//! is decided by a [`SurfaceStrategy`]:
//! - [`RuntimeStrategy`] for surfaces inside a game viewport
//! - [`EditorStrategy`] for dockable editor windows

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod events;
pub mod factory;
pub mod handler;
pub mod strategy;
pub mod surface;

pub use events::{
    AnalogInputEvent, CharacterEvent, FocusCause, FocusEvent, KeyEvent, PointerEvent, Reply,
};
pub use factory::{
    BoundHandler, HandlerId, HandlerOuter, InputHandlerFactory, OuterKind, DEFAULT_HANDLER_CLASS,
};
pub use handler::{DefaultInputHandler, InputHandler};
pub use strategy::{
    EditorStrategy, RuntimeStrategy, SurfaceKind, SurfaceStrategy, EDITOR_SCRATCH_PACKAGE,
};
pub use surface::{InputSurface, SurfaceConfig, Visibility};
