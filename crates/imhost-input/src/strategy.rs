//! Per-variant surface behavior: where handlers are rooted and which context a surface targets.

use std::rc::Rc;

use imhost_core::{ContextIndex, ImHostError, Result, EDITOR_WINDOW_CONTEXT_INDEX_OFFSET};

use crate::factory::{BoundHandler, HandlerOuter, InputHandlerFactory};

/// Path of the scratch package editor handlers are rooted in.
pub const EDITOR_SCRATCH_PACKAGE: &str = "/Temp/InputHandlerOuter";

/// Which kind of surface a strategy drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Runtime,
    Editor,
}

/// What differs between runtime and editor surfaces.
pub trait SurfaceStrategy {
    /// Which kind of surface this strategy drives.
    fn kind(&self) -> SurfaceKind;

    /// Maps the index the surface was constructed with to the registry index.
    fn context_index(&self, base_index: ContextIndex) -> Result<ContextIndex> {
        Ok(base_index)
    }

    /// Whether the surface scales its GUI content with the DPI scale.
    fn applies_dpi_scale(&self) -> bool {
        true
    }

    /// Whether the canvas always matches the surface size, ignoring canvas settings.
    fn follows_surface_size(&self) -> bool {
        false
    }

    fn create_input_handler(
        &self,
        factory: &InputHandlerFactory,
        class: Option<&str>,
        context_index: ContextIndex,
    ) -> Option<BoundHandler>;
}

/// Surface shown inside a game viewport; handlers are rooted against the viewport.
#[derive(Debug, Clone)]
pub struct RuntimeStrategy {
    viewport: Rc<HandlerOuter>,
}

impl RuntimeStrategy {
    /// Creates a strategy rooting handlers against `viewport`.
    pub fn new(viewport: Rc<HandlerOuter>) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> &Rc<HandlerOuter> {
        &self.viewport
    }
}

impl SurfaceStrategy for RuntimeStrategy {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Runtime
    }

    fn create_input_handler(
        &self,
        factory: &InputHandlerFactory,
        class: Option<&str>,
        context_index: ContextIndex,
    ) -> Option<BoundHandler> {
        factory.new_handler(&self.viewport, class, context_index)
    }
}

thread_local! {
    static SCRATCH_PACKAGE: Rc<HandlerOuter> = HandlerOuter::scratch_package(EDITOR_SCRATCH_PACKAGE);
}

/// Surface hosted in a dockable editor window.
///
/// Handlers are rooted in a scratch package shared by all editor surfaces on
/// the thread, and the context index is offset into the editor window range.
#[derive(Debug, Clone)]
pub struct EditorStrategy {
    package: Rc<HandlerOuter>,
}

impl Default for EditorStrategy {
    fn default() -> Self {
        Self {
            package: SCRATCH_PACKAGE.with(Rc::clone),
        }
    }
}

impl EditorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific package instead of the shared scratch package.
    pub fn with_package(package: Rc<HandlerOuter>) -> Self {
        Self { package }
    }

    pub fn package(&self) -> &Rc<HandlerOuter> {
        &self.package
    }
}

impl SurfaceStrategy for EditorStrategy {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Editor
    }

    /// Slots must be non-negative so editor windows never reach into the simulation range.
    fn context_index(&self, base_index: ContextIndex) -> Result<ContextIndex> {
        if base_index < 0 {
            return Err(ImHostError::SlotOutOfRange(base_index));
        }
        EDITOR_WINDOW_CONTEXT_INDEX_OFFSET
            .checked_add(base_index)
            .ok_or(ImHostError::SlotOutOfRange(base_index))
    }

    fn applies_dpi_scale(&self) -> bool {
        false
    }

    fn follows_surface_size(&self) -> bool {
        true
    }

    fn create_input_handler(
        &self,
        factory: &InputHandlerFactory,
        class: Option<&str>,
        context_index: ContextIndex,
    ) -> Option<BoundHandler> {
        factory.new_handler(&self.package, class, context_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::OuterKind;

    #[test]
    fn test_editor_strategies_share_scratch_package() {
        let a = EditorStrategy::new();
        let b = EditorStrategy::new();
        assert!(Rc::ptr_eq(a.package(), b.package()));
        assert_eq!(a.package().kind(), OuterKind::ScratchPackage);
        assert_eq!(a.context_index(2).unwrap(), EDITOR_WINDOW_CONTEXT_INDEX_OFFSET + 2);
    }

    #[test]
    fn test_editor_slots_outside_range_are_rejected() {
        let strategy = EditorStrategy::new();
        assert!(matches!(
            strategy.context_index(-1),
            Err(ImHostError::SlotOutOfRange(-1))
        ));
        assert!(strategy.context_index(ContextIndex::MAX).is_err());

        let last = ContextIndex::MAX - EDITOR_WINDOW_CONTEXT_INDEX_OFFSET;
        assert_eq!(strategy.context_index(last).unwrap(), ContextIndex::MAX);
        assert!(strategy.context_index(last + 1).is_err());
    }

    #[test]
    fn test_runtime_handlers_rooted_in_viewport() {
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let strategy = RuntimeStrategy::new(Rc::clone(&viewport));
        let factory = InputHandlerFactory::new();
        let bound = strategy.create_input_handler(&factory, None, 1).unwrap();
        assert!(viewport.is_rooted(bound.id()));
        assert_eq!(strategy.context_index(1).unwrap(), 1);
    }
}
