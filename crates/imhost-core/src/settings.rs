//! Persisted configuration for imhost.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::font_atlas::FontConfig;

/// How DPI scaling is applied to GUI content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DpiScaleMode {
    /// Content is drawn at 1:1 regardless of the host scale.
    None,
    /// Content and fonts are scaled by [`DpiScaleInfo::scale`].
    #[default]
    Scale,
}

/// DPI scale reported by the environment, plus how to use it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpiScaleInfo {
    pub scale: f32,
    pub mode: DpiScaleMode,
}

impl Default for DpiScaleInfo {
    fn default() -> Self {
        Self {
            scale: 1.0,
            mode: DpiScaleMode::Scale,
        }
    }
}

impl DpiScaleInfo {
    #[must_use]
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Scale actually applied to contexts and fonts. Invalid values fall back to 1.
    #[must_use]
    pub fn effective_scale(&self) -> f32 {
        match self.mode {
            DpiScaleMode::None => 1.0,
            DpiScaleMode::Scale if self.scale.is_finite() && self.scale > 0.0 => self.scale,
            DpiScaleMode::Scale => 1.0,
        }
    }
}

/// Where the minimum canvas size of a runtime surface comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CanvasSizeType {
    /// Fixed size from [`CanvasSizeInfo::width`] and [`CanvasSizeInfo::height`].
    Custom,
    /// Size of the desktop the host runs on.
    #[default]
    Desktop,
    /// Always the size of the surface itself.
    Viewport,
}

/// Canvas sizing for runtime surfaces.
///
/// The canvas is the area the GUI lays out in. It can be larger than the
/// surface, in which case the surface shows only part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSizeInfo {
    pub size_type: CanvasSizeType,
    pub width: u32,
    pub height: u32,
    /// Grow the canvas to cover the surface when the surface is larger.
    pub extend_to_viewport: bool,
}

impl Default for CanvasSizeInfo {
    fn default() -> Self {
        Self {
            size_type: CanvasSizeType::Desktop,
            width: 3840,
            height: 2160,
            extend_to_viewport: true,
        }
    }
}

impl CanvasSizeInfo {
    /// Smallest canvas in pixels, given the current desktop size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn min_canvas_size(&self, desktop_size: Vec2) -> Vec2 {
        match self.size_type {
            CanvasSizeType::Custom => Vec2::new(self.width as f32, self.height as f32),
            CanvasSizeType::Desktop => desktop_size.max(Vec2::ZERO),
            CanvasSizeType::Viewport => Vec2::ZERO,
        }
    }

    /// Whether the canvas grows with the surface.
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.size_type == CanvasSizeType::Viewport || self.extend_to_viewport
    }
}

/// Global configuration options for imhost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the input handler class surfaces create. `None` uses the default handler.
    pub input_handler_class: Option<String>,

    /// DPI scaling.
    pub dpi_scale: DpiScaleInfo,

    /// Whether surfaces start with the host cursor hidden.
    pub hide_mouse_cursor: bool,

    /// Whether surfaces let mouse input pass through to widgets beneath them.
    pub transparent_mouse_input: bool,

    /// Extra fonts merged into the atlas, e.g. for CJK glyph ranges.
    pub extra_fonts: BTreeMap<String, FontConfig>,

    /// Canvas sizing for runtime surfaces.
    pub canvas_size: CanvasSizeInfo,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_handler_class: None,
            dpi_scale: DpiScaleInfo::default(),
            hide_mouse_cursor: true,
            transparent_mouse_input: false,
            extra_fonts: BTreeMap::new(),
            canvas_size: CanvasSizeInfo::default(),
        }
    }
}

impl Settings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes settings as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Writes settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json_str(r#"{ "input_handler_class": "GameInputHandler" }"#).unwrap();
        assert_eq!(settings.input_handler_class.as_deref(), Some("GameInputHandler"));
        assert!(settings.hide_mouse_cursor);
        assert_eq!(settings.dpi_scale, DpiScaleInfo::default());
    }

    #[test]
    fn test_json_round_trip_keeps_fonts() {
        let mut settings = Settings::default();
        settings.extra_fonts.insert(
            "CJK".into(),
            FontConfig::new("CJK", 16.0, vec![(0x4E00, 0x9FAF)]),
        );
        let json = settings.to_json_string().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_effective_scale() {
        assert_eq!(DpiScaleInfo::new(2.0).effective_scale(), 2.0);
        assert_eq!(DpiScaleInfo::new(-1.0).effective_scale(), 1.0);
        let off = DpiScaleInfo {
            scale: 2.0,
            mode: DpiScaleMode::None,
        };
        assert_eq!(off.effective_scale(), 1.0);
    }

    #[test]
    fn test_canvas_size_sources() {
        let desktop = Vec2::new(2560.0, 1440.0);

        let custom = CanvasSizeInfo {
            size_type: CanvasSizeType::Custom,
            width: 1024,
            height: 768,
            extend_to_viewport: false,
        };
        assert_eq!(custom.min_canvas_size(desktop), Vec2::new(1024.0, 768.0));
        assert!(!custom.is_adaptive());

        let default = CanvasSizeInfo::default();
        assert_eq!(default.min_canvas_size(desktop), desktop);
        assert!(default.is_adaptive());

        let viewport = CanvasSizeInfo {
            size_type: CanvasSizeType::Viewport,
            extend_to_viewport: false,
            ..CanvasSizeInfo::default()
        };
        assert_eq!(viewport.min_canvas_size(desktop), Vec2::ZERO);
        assert!(viewport.is_adaptive());

        let settings =
            Settings::from_json_str(r#"{ "canvas_size": { "size_type": "Viewport" } }"#).unwrap();
        assert_eq!(settings.canvas_size.size_type, CanvasSizeType::Viewport);
        assert_eq!(settings.canvas_size.width, 3840);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Settings::from_json_str("{ not json"),
            Err(crate::ImHostError::JsonError(_))
        ));
    }
}
