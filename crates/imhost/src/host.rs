//! Module-level entry point tying settings, contexts and input handlers together.

use std::rc::Rc;

use glam::Vec2;
use imhost_core::{
    ContextRegistry, DpiScaleInfo, GuiContext, HostGeometry, ImHostError, OwnerKey, Result,
    Settings,
};
use imhost_input::{
    EditorStrategy, HandlerOuter, InputHandlerFactory, InputSurface, RuntimeStrategy,
    SurfaceConfig, SurfaceStrategy,
};

/// Which settings differed in the last [`Host::apply_settings`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SettingsChanges {
    pub input_handler_class: bool,
    pub dpi_scale: bool,
    pub hide_mouse_cursor: bool,
    pub transparent_mouse_input: bool,
    pub fonts: bool,
    pub canvas_size: bool,
}

impl SettingsChanges {
    /// Returns true if anything changed.
    pub fn any(&self) -> bool {
        self.input_handler_class
            || self.dpi_scale
            || self.hide_mouse_cursor
            || self.transparent_mouse_input
            || self.fonts
            || self.canvas_size
    }
}

/// Owns the context registry, the handler factory and the active settings.
///
/// Surfaces are owned by the caller; after [`Host::apply_settings`] they are
/// brought up to date with [`Host::refresh_surface`].
pub struct Host {
    settings: Settings,
    registry: ContextRegistry,
    factory: InputHandlerFactory,
    desktop_size: Vec2,
}

impl Host {
    /// Creates a host with the default font atlas plus the fonts in `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let registry =
            ContextRegistry::with_fonts(Some(settings.extra_fonts.clone()), settings.dpi_scale)?;
        log::info!(
            "imhost started (dpi scale {}, handler class {})",
            settings.dpi_scale.effective_scale(),
            settings
                .input_handler_class
                .as_deref()
                .unwrap_or(imhost_input::DEFAULT_HANDLER_CLASS)
        );
        Ok(Self {
            settings,
            registry,
            factory: InputHandlerFactory::new(),
            desktop_size: Vec2::ZERO,
        })
    }

    /// Returns the active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the context registry.
    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    /// Returns a mutable reference to the context registry.
    pub fn registry_mut(&mut self) -> &mut ContextRegistry {
        &mut self.registry
    }

    /// Returns the input handler factory.
    pub fn factory(&self) -> &InputHandlerFactory {
        &self.factory
    }

    /// Factory access for registering custom handler classes.
    pub fn factory_mut(&mut self) -> &mut InputHandlerFactory {
        &mut self.factory
    }

    /// Returns the context of `owner`, creating it on first use.
    pub fn world_context(&mut self, owner: OwnerKey) -> Result<&mut GuiContext> {
        self.registry.get_or_create(owner)
    }

    /// Updates every live context and prunes dead ones.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.registry.tick(delta_seconds);
    }

    /// Creates a surface for a game viewport, targeting the context of `owner`.
    ///
    /// The context is created if it does not exist yet.
    pub fn create_runtime_surface(
        &mut self,
        viewport: &Rc<HandlerOuter>,
        owner: OwnerKey,
    ) -> Result<InputSurface<RuntimeStrategy>> {
        let index = self.registry.get_or_create(owner)?.index();
        let mut surface = InputSurface::new(
            RuntimeStrategy::new(Rc::clone(viewport)),
            index,
            &self.factory,
            &self.surface_config(),
        )?;
        surface.set_dpi_scale(self.settings.dpi_scale.effective_scale());
        surface.update_mouse_cursor(&self.registry);
        Ok(surface)
    }

    /// Creates a surface for the editor window in `slot`.
    pub fn create_editor_surface(&mut self, slot: u32) -> Result<InputSurface<EditorStrategy>> {
        let owner = OwnerKey::EditorWindow(slot);
        self.registry.get_or_create(owner)?;
        let base_index = i32::try_from(slot).map_err(|_| ImHostError::OwnerOutOfRange(owner))?;
        let mut surface = InputSurface::new(
            EditorStrategy::new(),
            base_index,
            &self.factory,
            &self.surface_config(),
        )?;
        surface.update_mouse_cursor(&self.registry);
        Ok(surface)
    }

    /// Per-frame surface upkeep: sizes the canvas to `geometry` and refreshes the cursor.
    pub fn update_surface<S: SurfaceStrategy>(
        &mut self,
        surface: &mut InputSurface<S>,
        geometry: &HostGeometry,
    ) {
        surface.update_canvas_size(&mut self.registry, geometry.local_size);
        surface.update_mouse_cursor(&self.registry);
    }

    /// Replaces the active settings and reports what changed.
    ///
    /// DPI and font changes are applied to the registry immediately. A failed
    /// font rebuild leaves the previous settings in place.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<SettingsChanges> {
        let old_scale = self.settings.dpi_scale.effective_scale();
        let new_scale = settings.dpi_scale.effective_scale();
        let changes = SettingsChanges {
            input_handler_class: settings.input_handler_class != self.settings.input_handler_class,
            dpi_scale: (new_scale - old_scale).abs() > f32::EPSILON,
            hide_mouse_cursor: settings.hide_mouse_cursor != self.settings.hide_mouse_cursor,
            transparent_mouse_input: settings.transparent_mouse_input
                != self.settings.transparent_mouse_input,
            fonts: settings.extra_fonts != self.settings.extra_fonts,
            canvas_size: settings.canvas_size != self.settings.canvas_size,
        };

        if changes.fonts {
            self.registry
                .rebuild_font_atlas(Some(settings.extra_fonts.clone()))?;
        }
        if changes.dpi_scale {
            self.registry.set_dpi_scale(settings.dpi_scale);
        }

        if changes.any() {
            log::debug!("applied settings: {changes:?}");
        }
        self.settings = settings;
        Ok(changes)
    }

    /// Sets the DPI scale without touching the rest of the settings.
    ///
    /// Pass the result to [`Host::refresh_surface`] so existing surfaces pick
    /// up the new scale.
    pub fn set_dpi_scale(&mut self, info: DpiScaleInfo) -> SettingsChanges {
        let old_scale = self.settings.dpi_scale.effective_scale();
        self.settings.dpi_scale = info;
        self.registry.set_dpi_scale(info);
        SettingsChanges {
            dpi_scale: (info.effective_scale() - old_scale).abs() > f32::EPSILON,
            ..SettingsChanges::default()
        }
    }

    /// Desktop size used by desktop-sized canvases.
    pub fn desktop_size(&self) -> Vec2 {
        self.desktop_size
    }

    /// Records the desktop size, e.g. from the primary monitor.
    ///
    /// Pass the result to [`Host::refresh_surface`] so existing surfaces resize their canvas.
    pub fn set_desktop_size(&mut self, size: Vec2) -> SettingsChanges {
        let changed = size != self.desktop_size;
        self.desktop_size = size;
        SettingsChanges {
            canvas_size: changed,
            ..SettingsChanges::default()
        }
    }

    /// Brings a surface in line with the current settings after `changes`.
    pub fn refresh_surface<S: SurfaceStrategy>(
        &self,
        surface: &mut InputSurface<S>,
        changes: SettingsChanges,
    ) {
        if changes.input_handler_class {
            surface.recreate_input_handler(
                &self.factory,
                self.settings.input_handler_class.as_deref(),
            );
        }
        if changes.dpi_scale {
            surface.set_dpi_scale(self.settings.dpi_scale.effective_scale());
        }
        if changes.transparent_mouse_input {
            surface.set_transparent_mouse_input(self.settings.transparent_mouse_input);
        }
        if changes.hide_mouse_cursor {
            surface.set_hide_mouse_cursor(self.settings.hide_mouse_cursor, &self.registry);
        }
        if changes.canvas_size {
            surface.set_canvas_size_info(&self.settings.canvas_size, self.desktop_size);
        }
    }

    fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            input_enabled: true,
            desktop_size: self.desktop_size,
            ..SurfaceConfig::from(&self.settings)
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("settings", &self.settings)
            .field("contexts", &self.registry.len())
            .field("factory", &self.factory)
            .field("desktop_size", &self.desktop_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imhost_core::{
        CanvasSizeInfo, CanvasSizeType, FontConfig, EDITOR_WINDOW_CONTEXT_INDEX_OFFSET,
        MAX_SIMULATION_INSTANCES,
    };

    #[test]
    fn test_runtime_surface_creates_context() {
        let mut host = Host::new(Settings::default()).unwrap();
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let surface = host
            .create_runtime_surface(&viewport, OwnerKey::Simulation(0))
            .unwrap();
        assert_eq!(surface.context_index(), 1);
        assert!(host.registry().contains(1));
        assert!(surface.has_input_handler());
    }

    #[test]
    fn test_editor_surface_uses_window_context() {
        let mut host = Host::new(Settings::default()).unwrap();
        let surface = host.create_editor_surface(2).unwrap();
        assert_eq!(surface.context_index(), EDITOR_WINDOW_CONTEXT_INDEX_OFFSET + 2);
        assert_eq!(
            host.registry().get(surface.context_index()).unwrap().name(),
            "EditorWindow2"
        );
    }

    #[test]
    fn test_apply_settings_reports_changes() {
        let mut host = Host::new(Settings::default()).unwrap();
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let mut surface = host
            .create_runtime_surface(&viewport, OwnerKey::Editor)
            .unwrap();
        let first_handler = surface.input_handler_id();

        let mut settings = Settings::default();
        settings.input_handler_class = Some("Missing".into());
        settings.dpi_scale = DpiScaleInfo::new(2.0);
        let changes = host.apply_settings(settings).unwrap();
        assert!(changes.input_handler_class);
        assert!(changes.dpi_scale);
        assert!(!changes.fonts);

        host.refresh_surface(&mut surface, changes);
        assert_ne!(surface.input_handler_id(), first_handler);
        assert_eq!(viewport.rooted_count(), 1);
        assert_eq!(surface.gui_transform().matrix2.x_axis.x, 2.0);
        assert_eq!(host.registry().get(0).unwrap().dpi_scale(), 2.0);
    }

    #[test]
    fn test_failed_font_change_keeps_settings() {
        let mut host = Host::new(Settings::default()).unwrap();
        let mut settings = Settings::default();
        settings
            .extra_fonts
            .insert("Broken".into(), FontConfig::new("Broken", -1.0, vec![]));
        assert!(host.apply_settings(settings).is_err());
        assert!(host.settings().extra_fonts.is_empty());
    }

    #[test]
    fn test_out_of_range_owners_get_no_surface() {
        let mut host = Host::new(Settings::default()).unwrap();
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let simulation = OwnerKey::Simulation(MAX_SIMULATION_INSTANCES);
        assert!(host.create_runtime_surface(&viewport, simulation).is_err());
        assert!(host.world_context(simulation).is_err());
        assert!(host.create_editor_surface(u32::MAX).is_err());
        assert!(host.registry().is_empty());
        assert_eq!(viewport.rooted_count(), 0);
    }

    #[test]
    fn test_set_dpi_scale_reports_change_for_surfaces() {
        let mut host = Host::new(Settings::default()).unwrap();
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let mut surface = host
            .create_runtime_surface(&viewport, OwnerKey::Editor)
            .unwrap();

        let changes = host.set_dpi_scale(DpiScaleInfo::new(1.5));
        assert_eq!(
            changes,
            SettingsChanges {
                dpi_scale: true,
                ..SettingsChanges::default()
            }
        );
        host.refresh_surface(&mut surface, changes);
        assert_eq!(surface.gui_transform().matrix2.x_axis.x, 1.5);

        assert!(!host.set_dpi_scale(DpiScaleInfo::new(1.5)).any());
    }

    #[test]
    fn test_canvas_settings_reach_surfaces() {
        let mut host = Host::new(Settings::default()).unwrap();
        let viewport = HandlerOuter::game_viewport("GameViewport");
        let mut surface = host
            .create_runtime_surface(&viewport, OwnerKey::Editor)
            .unwrap();
        let geometry = HostGeometry::new(Vec2::new(800.0, 600.0), glam::Affine2::IDENTITY);

        host.update_surface(&mut surface, &geometry);
        assert_eq!(host.registry().get(0).unwrap().display_size(), Vec2::new(800.0, 600.0));

        let changes = host.set_desktop_size(Vec2::new(1920.0, 1080.0));
        host.refresh_surface(&mut surface, changes);
        host.update_surface(&mut surface, &geometry);
        assert_eq!(host.registry().get(0).unwrap().display_size(), Vec2::new(1920.0, 1080.0));

        let mut settings = host.settings().clone();
        settings.canvas_size = CanvasSizeInfo {
            size_type: CanvasSizeType::Viewport,
            ..CanvasSizeInfo::default()
        };
        let changes = host.apply_settings(settings).unwrap();
        assert!(changes.canvas_size);
        host.refresh_surface(&mut surface, changes);
        host.update_surface(&mut surface, &geometry);
        assert_eq!(host.registry().get(0).unwrap().display_size(), Vec2::new(800.0, 600.0));
    }
}
