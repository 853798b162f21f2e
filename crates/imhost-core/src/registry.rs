//! Context registry: creates, ticks and tears down GUI contexts by owner.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::context::{Frame, GuiContext, MultiContextDrawCallback};
use crate::delegate::{DelegateHandle, Multicast};
use crate::draw::TextureId;
use crate::error::Result;
use crate::font_atlas::{atlas_configs, AtlasId, FontAtlas, FontAtlasStore, FontConfig};
use crate::owner::{ContextIndex, OwnerKey};
use crate::settings::DpiScaleInfo;

/// Decides whether a context's owner still exists.
pub enum Liveness {
    /// The owner lives as long as the registry, or until explicitly removed.
    Always,
    /// The owner is a simulation instance; asks the registry's simulation hook.
    Simulation(u32),
    /// Arbitrary host predicate.
    Predicate(Box<dyn Fn() -> bool>),
}

impl std::fmt::Debug for Liveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Liveness::Always => write!(f, "Always"),
            Liveness::Simulation(instance) => write!(f, "Simulation({instance})"),
            Liveness::Predicate(_) => write!(f, "Predicate"),
        }
    }
}

struct ContextEntry {
    context: GuiContext,
    liveness: Liveness,
}

type ContextCreated = dyn FnMut(ContextIndex, &mut GuiContext);
type FontAtlasBuilt = dyn FnMut();
type FontResourcesReleased = dyn FnMut(AtlasId);
type SimulationLiveness = dyn Fn(u32) -> bool;

/// Registry of GUI contexts keyed by context index.
///
/// Contexts are created lazily on first lookup, updated once per
/// [`ContextRegistry::tick`], and removed when their owner goes away.
pub struct ContextRegistry {
    contexts: BTreeMap<ContextIndex, ContextEntry>,
    fonts: FontAtlasStore,
    custom_fonts: Option<BTreeMap<String, FontConfig>>,
    dpi_scale: f32,
    frame: u64,
    simulation_liveness: Box<SimulationLiveness>,
    shared_draw_callbacks: Multicast<MultiContextDrawCallback>,
    context_created: Multicast<ContextCreated>,
    font_atlas_built: Multicast<FontAtlasBuilt>,
    font_resources_released: Multicast<FontResourcesReleased>,
}

impl ContextRegistry {
    /// Creates an empty registry with the default font atlas.
    pub fn new() -> Result<Self> {
        Self::with_fonts(None, DpiScaleInfo::default())
    }

    /// Creates an empty registry whose atlas includes `custom_fonts`, built at `dpi`.
    pub fn with_fonts(
        custom_fonts: Option<BTreeMap<String, FontConfig>>,
        dpi: DpiScaleInfo,
    ) -> Result<Self> {
        let dpi_scale = dpi.effective_scale();
        let fonts = FontAtlasStore::new(&atlas_configs(custom_fonts.as_ref()), dpi_scale)?;
        Ok(Self {
            contexts: BTreeMap::new(),
            fonts,
            custom_fonts,
            dpi_scale,
            frame: 0,
            simulation_liveness: Box::new(|_| true),
            shared_draw_callbacks: Multicast::new(),
            context_created: Multicast::new(),
            font_atlas_built: Multicast::new(),
            font_resources_released: Multicast::new(),
        })
    }

    /// Gets or creates the context for a well-known owner.
    ///
    /// Simulation owners are kept alive only while the simulation hook
    /// reports their instance as running. Fails for owners outside the
    /// context index range.
    pub fn get_or_create(&mut self, owner: OwnerKey) -> Result<&mut GuiContext> {
        let index = owner.index()?;
        let liveness = match owner.simulation_instance() {
            Some(instance) => Liveness::Simulation(instance),
            None => Liveness::Always,
        };
        Ok(self.get_or_create_with(index, &owner.context_name(), liveness))
    }

    /// Gets or creates the context registered under `index`.
    ///
    /// `name` and `liveness` are only used when the context is created.
    pub fn get_or_create_with(
        &mut self,
        index: ContextIndex,
        name: &str,
        liveness: Liveness,
    ) -> &mut GuiContext {
        match self.contexts.entry(index) {
            Entry::Occupied(occupied) => &mut occupied.into_mut().context,
            Entry::Vacant(vacant) => {
                let context = GuiContext::new(
                    index,
                    name,
                    self.fonts.current().texture_id(),
                    self.dpi_scale,
                );
                log::debug!("created GUI context {index} '{name}' ({liveness:?})");

                let entry = vacant.insert(ContextEntry { context, liveness });
                for subscriber in self.context_created.iter_mut() {
                    subscriber(index, &mut entry.context);
                }
                &mut entry.context
            }
        }
    }

    /// Looks up a context without creating it.
    pub fn get(&self, index: ContextIndex) -> Option<&GuiContext> {
        self.contexts.get(&index).map(|e| &e.context)
    }

    /// Gets a mutable reference to a context without creating it.
    pub fn get_mut(&mut self, index: ContextIndex) -> Option<&mut GuiContext> {
        self.contexts.get_mut(&index).map(|e| &mut e.context)
    }

    /// Checks if a context is registered under `index`.
    pub fn contains(&self, index: ContextIndex) -> bool {
        self.contexts.contains_key(&index)
    }

    /// Tears down a context. Returns false if nothing was registered under `index`.
    pub fn remove(&mut self, index: ContextIndex) -> bool {
        let removed = self.contexts.remove(&index).is_some();
        if removed {
            log::debug!("removed GUI context {index}");
        }
        removed
    }

    /// Returns the number of live contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns true if no context is registered.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Indices of all live contexts in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = ContextIndex> + '_ {
        self.contexts.keys().copied()
    }

    /// Number of completed ticks; draw data is tagged with this value.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Effective DPI scale applied to contexts and fonts.
    pub fn dpi_scale(&self) -> f32 {
        self.dpi_scale
    }

    /// Sets the hook that tells whether a simulation instance still exists.
    pub fn set_simulation_liveness<F>(&mut self, is_alive: F)
    where
        F: Fn(u32) -> bool + 'static,
    {
        self.simulation_liveness = Box::new(is_alive);
    }

    /// Advances every live context by one frame.
    ///
    /// Contexts whose owner is gone are removed after the pass; the rest are
    /// updated. Superseded font atlases are then counted down and released.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.frame += 1;
        let font_texture = self.fonts.current().texture_id();

        let mut dead = Vec::new();
        for (&index, entry) in &mut self.contexts {
            let alive = match &entry.liveness {
                Liveness::Always => true,
                Liveness::Simulation(instance) => (self.simulation_liveness)(*instance),
                Liveness::Predicate(is_alive) => is_alive(),
            };

            if alive {
                entry.context.update(
                    delta_seconds,
                    self.frame,
                    font_texture,
                    &mut self.shared_draw_callbacks,
                );
            } else {
                dead.push(index);
            }
        }

        for index in dead {
            log::debug!("GUI context {index} lost its owner");
            self.remove(index);
        }

        for atlas in self.fonts.advance_frame() {
            log::debug!("releasing font atlas {:?}", atlas.id());
            for subscriber in self.font_resources_released.iter_mut() {
                subscriber(atlas.id());
            }
        }
    }

    /// The atlas new draw data references.
    pub fn font_atlas(&self) -> &FontAtlas {
        self.fonts.current()
    }

    /// Resolves a texture id to the current or a still pending font atlas.
    pub fn resolve_texture(&self, texture: TextureId) -> Option<&FontAtlas> {
        self.fonts.resolve(texture)
    }

    /// Number of superseded atlases still waiting for release.
    pub fn pending_font_releases(&self) -> usize {
        self.fonts.pending_release_count()
    }

    /// Rebuilds the shared font atlas.
    ///
    /// `custom_fonts` replaces the remembered extra fonts when given. On
    /// failure the current atlas stays authoritative and nothing is queued.
    pub fn rebuild_font_atlas(
        &mut self,
        custom_fonts: Option<BTreeMap<String, FontConfig>>,
    ) -> Result<AtlasId> {
        let custom_fonts = custom_fonts.or_else(|| self.custom_fonts.clone());
        let configs = atlas_configs(custom_fonts.as_ref());

        let id = match self.fonts.rebuild(&configs, self.dpi_scale) {
            Ok(id) => id,
            Err(err) => {
                log::error!("font atlas rebuild failed: {err}");
                return Err(err);
            }
        };
        self.custom_fonts = custom_fonts;

        let texture = self.fonts.current().texture_id();
        for entry in self.contexts.values_mut() {
            entry.context.refresh_font_texture(texture);
        }

        log::info!("font atlas {id:?} built at scale {}", self.dpi_scale);
        for subscriber in self.font_atlas_built.iter_mut() {
            subscriber();
        }
        Ok(id)
    }

    /// Applies a DPI scale change to every context and rebuilds fonts at the new scale.
    pub fn set_dpi_scale(&mut self, info: DpiScaleInfo) {
        let scale = info.effective_scale();
        if (scale - self.dpi_scale).abs() <= f32::EPSILON {
            return;
        }

        log::info!("DPI scale changed from {} to {scale}", self.dpi_scale);
        self.dpi_scale = scale;
        for entry in self.contexts.values_mut() {
            entry.context.set_dpi_scale(scale);
        }

        // A failure is already logged; the previous atlas keeps serving.
        let _ = self.rebuild_font_atlas(None);
    }

    /// Adds a callback run for every context on every update.
    pub fn add_multi_context_draw<F>(&mut self, callback: F) -> DelegateHandle
    where
        F: FnMut(ContextIndex, &mut Frame<'_>) + 'static,
    {
        self.shared_draw_callbacks.add(Box::new(callback))
    }

    /// Removes a callback added with [`ContextRegistry::add_multi_context_draw`].
    pub fn remove_multi_context_draw(&mut self, handle: DelegateHandle) -> bool {
        self.shared_draw_callbacks.remove(handle)
    }

    /// Subscribes to context creation. Called with the new context's index.
    pub fn on_context_created<F>(&mut self, subscriber: F) -> DelegateHandle
    where
        F: FnMut(ContextIndex, &mut GuiContext) + 'static,
    {
        self.context_created.add(Box::new(subscriber))
    }

    /// Removes a context creation subscriber.
    pub fn remove_on_context_created(&mut self, handle: DelegateHandle) -> bool {
        self.context_created.remove(handle)
    }

    /// Subscribes to successful font atlas rebuilds.
    pub fn on_font_atlas_built<F>(&mut self, subscriber: F) -> DelegateHandle
    where
        F: FnMut() + 'static,
    {
        self.font_atlas_built.add(Box::new(subscriber))
    }

    /// Removes a font atlas subscriber.
    pub fn remove_on_font_atlas_built(&mut self, handle: DelegateHandle) -> bool {
        self.font_atlas_built.remove(handle)
    }

    /// Subscribes to the release of superseded font atlases.
    pub fn on_font_resources_released<F>(&mut self, subscriber: F) -> DelegateHandle
    where
        F: FnMut(AtlasId) + 'static,
    {
        self.font_resources_released.add(Box::new(subscriber))
    }

    /// Removes a font release subscriber.
    pub fn remove_on_font_resources_released(&mut self, handle: DelegateHandle) -> bool {
        self.font_resources_released.remove(handle)
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("contexts", &self.contexts.keys().collect::<Vec<_>>())
            .field("frame", &self.frame)
            .field("dpi_scale", &self.dpi_scale)
            .field("font_atlas", &self.fonts.current().id())
            .field(
                "pending_release",
                &self.fonts.pending_release_ids().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
