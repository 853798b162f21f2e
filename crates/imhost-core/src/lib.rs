//! Core of imhost.
//!
//! This crate owns everything that does not depend on a particular host
//! windowing system:
//! - [`ContextRegistry`] creating, ticking and removing GUI contexts by owner
//! - [`GuiContext`] with its input queue, draw callbacks and [`DrawData`]
//! - The shared [`FontAtlas`] and deferred release of superseded atlases
//! - Coordinate transforms between host screen space and GUI logical space
//! - Persisted [`Settings`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Settings structs legitimately have several boolean flags
#![allow(clippy::struct_excessive_bools)]
// Accessors returning Self-derived values don't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod delegate;
pub mod draw;
pub mod error;
pub mod font_atlas;
pub mod geometry;
pub mod input;
pub mod owner;
pub mod registry;
pub mod settings;

pub use context::{ContextId, DrawCallback, Frame, GuiContext, MultiContextDrawCallback};
pub use delegate::{DelegateHandle, Multicast};
pub use draw::{DrawCmd, DrawData, DrawList, DrawListBuilder, DrawVert, TextureId};
pub use error::{ImHostError, Result};
pub use font_atlas::{AtlasId, FontAtlas, FontAtlasStore, FontConfig, FONT_RELEASE_FRAMES};
pub use geometry::{HostGeometry, Rect};
pub use input::{
    GamepadAxis, InputEvent, InputModality, InputQueue, InputState, Key, Modifiers, MouseButton,
    MouseCursor,
};
pub use owner::{ContextIndex, OwnerKey, EDITOR_WINDOW_CONTEXT_INDEX_OFFSET, MAX_SIMULATION_INSTANCES};
pub use registry::{ContextRegistry, Liveness};
pub use settings::{CanvasSizeInfo, CanvasSizeType, DpiScaleInfo, DpiScaleMode, Settings};

// Re-export glam types for convenience
pub use glam::{Affine2, Vec2};
