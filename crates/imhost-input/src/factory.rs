//! Creation and release of input handlers.
//!
//! Handlers are registered against an outer (the game viewport for runtime
//! surfaces, a scratch package for editor windows) that keeps them rooted
//! while a surface uses them. Releasing a handler unroots it; a handler that
//! is never released simply stays rooted until the outer goes away.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use imhost_core::ContextIndex;

use crate::handler::{DefaultInputHandler, InputHandler};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Name under which [`DefaultInputHandler`] is registered.
pub const DEFAULT_HANDLER_CLASS: &str = "DefaultInputHandler";

/// Identity of one created handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

/// What kind of object a handler is rooted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterKind {
    GameViewport,
    ScratchPackage,
}

/// Ownership root for input handlers.
#[derive(Debug)]
pub struct HandlerOuter {
    name: String,
    kind: OuterKind,
    rooted: RefCell<BTreeSet<HandlerId>>,
    accepts_allocations: Cell<bool>,
}

impl HandlerOuter {
    pub fn new(name: impl Into<String>, kind: OuterKind) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind,
            rooted: RefCell::new(BTreeSet::new()),
            accepts_allocations: Cell::new(true),
        })
    }

    pub fn game_viewport(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, OuterKind::GameViewport)
    }

    pub fn scratch_package(path: impl Into<String>) -> Rc<Self> {
        Self::new(path, OuterKind::ScratchPackage)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OuterKind {
        self.kind
    }

    /// Lets the host refuse new handler allocations, e.g. while tearing down.
    pub fn set_accepts_allocations(&self, accepts: bool) {
        self.accepts_allocations.set(accepts);
    }

    pub fn accepts_allocations(&self) -> bool {
        self.accepts_allocations.get()
    }

    pub fn is_rooted(&self, id: HandlerId) -> bool {
        self.rooted.borrow().contains(&id)
    }

    pub fn rooted_count(&self) -> usize {
        self.rooted.borrow().len()
    }

    fn add_to_root(&self, id: HandlerId) {
        self.rooted.borrow_mut().insert(id);
    }

    fn remove_from_root(&self, id: HandlerId) -> bool {
        self.rooted.borrow_mut().remove(&id)
    }
}

/// A handler created by the factory, together with the outer it is rooted in.
pub struct BoundHandler {
    id: HandlerId,
    class_name: String,
    context_index: ContextIndex,
    handler: Box<dyn InputHandler>,
    outer: Rc<HandlerOuter>,
}

impl BoundHandler {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn context_index(&self) -> ContextIndex {
        self.context_index
    }

    pub fn outer(&self) -> &Rc<HandlerOuter> {
        &self.outer
    }

    pub fn handler_mut(&mut self) -> &mut dyn InputHandler {
        self.handler.as_mut()
    }

    /// Unroots the handler from its outer.
    pub fn release(self) {
        if self.outer.remove_from_root(self.id) {
            log::debug!(
                "released input handler {:?} ({}) from '{}'",
                self.id,
                self.class_name,
                self.outer.name
            );
        }
    }
}

impl std::fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundHandler")
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .field("context_index", &self.context_index)
            .field("outer", &self.outer.name)
            .finish_non_exhaustive()
    }
}

type HandlerConstructor = Box<dyn Fn() -> Box<dyn InputHandler>>;

/// Creates input handlers by class name.
pub struct InputHandlerFactory {
    classes: BTreeMap<String, HandlerConstructor>,
}

impl Default for InputHandlerFactory {
    fn default() -> Self {
        let mut factory = Self {
            classes: BTreeMap::new(),
        };
        factory.register_class(DEFAULT_HANDLER_CLASS, || Box::new(DefaultInputHandler));
        factory
    }
}

impl InputHandlerFactory {
    /// Creates a factory that knows only the default handler class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler class. Replaces any class with the same name.
    pub fn register_class<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn InputHandler> + 'static,
    {
        self.classes.insert(name.into(), Box::new(constructor));
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Creates a handler of `class` rooted in `outer`.
    ///
    /// A missing or unknown class falls back to the default handler. Returns
    /// `None` when the outer refuses the allocation.
    pub fn new_handler(
        &self,
        outer: &Rc<HandlerOuter>,
        class: Option<&str>,
        context_index: ContextIndex,
    ) -> Option<BoundHandler> {
        let class_name = match class {
            Some(name) if self.classes.contains_key(name) => name,
            Some(name) => {
                log::warn!(
                    "couldn't load input handler class '{name}', using {DEFAULT_HANDLER_CLASS}"
                );
                DEFAULT_HANDLER_CLASS
            }
            None => DEFAULT_HANDLER_CLASS,
        };

        if !outer.accepts_allocations() {
            log::error!(
                "failed attempt to create input handler: class = {class_name}, outer = '{}'",
                outer.name
            );
            return None;
        }

        let constructor = self.classes.get(class_name)?;
        let mut handler = constructor();
        handler.initialize(context_index);

        let id = HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed));
        outer.add_to_root(id);
        log::debug!(
            "created input handler {id:?} ({class_name}) for context {context_index} in '{}'",
            outer.name
        );

        Some(BoundHandler {
            id,
            class_name: class_name.to_string(),
            context_index,
            handler,
            outer: Rc::clone(outer),
        })
    }

    /// Unroots a handler. Passing `None` is a no-op.
    pub fn release_handler(handler: Option<BoundHandler>) {
        if let Some(handler) = handler {
            handler.release();
        }
    }
}

impl std::fmt::Debug for InputHandlerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputHandlerFactory")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}
