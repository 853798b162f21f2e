//! Shared font atlas and the deferred release of superseded atlases.
//!
//! Every context draws text out of one atlas. Rebuilding swaps in a new atlas
//! immediately, while the previous one stays resolvable for
//! [`FONT_RELEASE_FRAMES`] ticks because draw data recorded against it may
//! still be in flight in the renderer.

use std::collections::{BTreeMap, VecDeque};

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::draw::TextureId;
use crate::error::{ImHostError, Result};

/// Ticks a superseded atlas stays alive. Larger than the renderer's frames in flight.
pub const FONT_RELEASE_FRAMES: u32 = 5;

/// Font atlas texture ids live above this value so they never collide with user textures.
pub const FONT_TEXTURE_ID_BASE: u64 = 1 << 32;

/// Largest font size accepted before DPI scaling.
pub const MAX_FONT_SIZE_PIXELS: f32 = 512.0;

const MAX_CODEPOINT: u32 = 0x0010_FFFF;
const MIN_ATLAS_WIDTH: u32 = 512;
/// Atlas textures never exceed this size in either dimension.
const MAX_ATLAS_SIZE: u32 = 16384;
const GLYPH_PADDING: u32 = 1;

/// Identity of one built atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasId(pub u64);

/// Configuration of one font merged into the atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    pub name: String,
    pub size_pixels: f32,
    /// Inclusive codepoint ranges to bake.
    pub glyph_ranges: Vec<(u32, u32)>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            size_pixels: 13.0,
            glyph_ranges: vec![(0x0020, 0x00FF)],
        }
    }
}

impl FontConfig {
    pub fn new(name: impl Into<String>, size_pixels: f32, glyph_ranges: Vec<(u32, u32)>) -> Self {
        Self {
            name: name.into(),
            size_pixels,
            glyph_ranges,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ImHostError::InvalidFontConfig {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !self.size_pixels.is_finite() || self.size_pixels <= 0.0 {
            return Err(invalid("size must be positive"));
        }
        if self.size_pixels > MAX_FONT_SIZE_PIXELS {
            return Err(invalid(&format!(
                "size {} exceeds {MAX_FONT_SIZE_PIXELS}",
                self.size_pixels
            )));
        }
        if self.glyph_ranges.is_empty() {
            return Err(invalid("no glyph ranges"));
        }
        for &(start, end) in &self.glyph_ranges {
            if start > end || end > MAX_CODEPOINT {
                return Err(invalid(&format!("bad glyph range {start:#x}..={end:#x}")));
            }
        }
        Ok(())
    }

    fn glyph_count(&self) -> u32 {
        self.glyph_ranges
            .iter()
            .map(|&(start, end)| end - start + 1)
            .fold(0u32, u32::saturating_add)
    }
}

/// A font baked into the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedFont {
    pub name: String,
    /// Pixel size after DPI scaling.
    pub size_pixels: f32,
    pub glyph_count: u32,
}

/// An immutable, built font atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAtlas {
    id: AtlasId,
    texture_id: TextureId,
    scale: f32,
    fonts: Vec<BakedFont>,
    texture_size: UVec2,
}

impl FontAtlas {
    /// Lays out `configs` at `scale`.
    ///
    /// Only the atlas layout is computed here; glyph rasterization belongs to
    /// the GUI backend.
    pub fn build(id: AtlasId, configs: &[FontConfig], scale: f32) -> Result<Self> {
        if configs.is_empty() {
            return Err(ImHostError::EmptyFontAtlas);
        }
        for config in configs {
            config.validate()?;
        }

        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        let fonts: Vec<BakedFont> = configs
            .iter()
            .map(|c| BakedFont {
                name: c.name.clone(),
                size_pixels: c.size_pixels * scale,
                glyph_count: c.glyph_count(),
            })
            .collect();

        let texture_size = layout_texture(&fonts)?;

        Ok(Self {
            id,
            texture_id: TextureId(FONT_TEXTURE_ID_BASE + id.0),
            scale,
            fonts,
            texture_size,
        })
    }

    pub fn id(&self) -> AtlasId {
        self.id
    }

    pub fn texture_id(&self) -> TextureId {
        self.texture_id
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn fonts(&self) -> &[BakedFont] {
        &self.fonts
    }

    pub fn font(&self, name: &str) -> Option<&BakedFont> {
        self.fonts.iter().find(|f| f.name == name)
    }

    pub fn texture_size(&self) -> UVec2 {
        self.texture_size
    }
}

/// Picks a power-of-two texture big enough for every glyph cell plus one row
/// reserved for the white texel.
///
/// Widths double until the glyphs fit in a square. At the maximum width the
/// glyphs must fit within [`MAX_ATLAS_SIZE`] rows or the layout fails.
fn layout_texture(fonts: &[BakedFont]) -> Result<UVec2> {
    let mut width = MIN_ATLAS_WIDTH;
    loop {
        match stack_glyph_rows(fonts, width) {
            Ok(height) if height <= width || width >= MAX_ATLAS_SIZE => {
                // `height` is at most MAX_ATLAS_SIZE, itself a power of two.
                return Ok(UVec2::new(width, height.next_power_of_two()));
            }
            Err(font) if width >= MAX_ATLAS_SIZE => {
                return Err(ImHostError::InvalidFontConfig {
                    name: font.to_string(),
                    reason: format!("glyphs do not fit in a {MAX_ATLAS_SIZE}px atlas"),
                });
            }
            _ => width *= 2,
        }
    }
}

/// Height of all glyph rows at `width`, or the font that overflowed the atlas.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stack_glyph_rows(fonts: &[BakedFont], width: u32) -> std::result::Result<u32, &str> {
    let mut height = GLYPH_PADDING + 1;
    for font in fonts {
        let cell = (font.size_pixels.ceil() as u32).saturating_add(GLYPH_PADDING);
        let per_row = (width / cell).max(1);
        let rows = font.glyph_count.div_ceil(per_row);
        height = rows
            .checked_mul(cell)
            .and_then(|block| height.checked_add(block))
            .filter(|&h| h <= MAX_ATLAS_SIZE)
            .ok_or(font.name.as_str())?;
    }
    Ok(height)
}

#[derive(Debug)]
struct PendingRelease {
    atlas: FontAtlas,
    frames_left: u32,
}

/// Owns the current atlas and a ring of superseded atlases awaiting release.
#[derive(Debug)]
pub struct FontAtlasStore {
    current: FontAtlas,
    pending: VecDeque<PendingRelease>,
    next_id: u64,
    release_frames: u32,
}

impl FontAtlasStore {
    /// Builds the first atlas.
    pub fn new(configs: &[FontConfig], scale: f32) -> Result<Self> {
        let current = FontAtlas::build(AtlasId(0), configs, scale)?;
        Ok(Self {
            current,
            pending: VecDeque::new(),
            next_id: 1,
            release_frames: FONT_RELEASE_FRAMES,
        })
    }

    /// The atlas new draw data should reference.
    pub fn current(&self) -> &FontAtlas {
        &self.current
    }

    /// Builds a replacement atlas and queues the current one for release.
    ///
    /// On error the store is left exactly as it was.
    pub fn rebuild(&mut self, configs: &[FontConfig], scale: f32) -> Result<AtlasId> {
        let atlas = FontAtlas::build(AtlasId(self.next_id), configs, scale)?;
        self.next_id += 1;

        let previous = std::mem::replace(&mut self.current, atlas);
        log::debug!(
            "font atlas {:?} superseded by {:?}, releasing in {} frames",
            previous.id,
            self.current.id,
            self.release_frames
        );
        self.pending.push_back(PendingRelease {
            atlas: previous,
            frames_left: self.release_frames,
        });

        Ok(self.current.id)
    }

    /// Counts one frame down for every pending atlas and returns those whose
    /// countdown reached zero. Each atlas is returned exactly once.
    pub fn advance_frame(&mut self) -> Vec<FontAtlas> {
        for item in &mut self.pending {
            item.frames_left = item.frames_left.saturating_sub(1);
        }

        let mut released = Vec::new();
        while self.pending.front().is_some_and(|item| item.frames_left == 0) {
            if let Some(item) = self.pending.pop_front() {
                released.push(item.atlas);
            }
        }
        released
    }

    /// Finds the current or a still pending atlas by its texture.
    pub fn resolve(&self, texture: TextureId) -> Option<&FontAtlas> {
        if self.current.texture_id == texture {
            return Some(&self.current);
        }
        self.pending
            .iter()
            .map(|item| &item.atlas)
            .find(|atlas| atlas.texture_id == texture)
    }

    /// Number of atlases waiting for release.
    pub fn pending_release_count(&self) -> usize {
        self.pending.len()
    }

    /// Ids of atlases waiting for release, oldest first.
    pub fn pending_release_ids(&self) -> impl Iterator<Item = AtlasId> + '_ {
        self.pending.iter().map(|item| item.atlas.id)
    }
}

/// Default font followed by extra fonts in name order.
pub fn atlas_configs(custom: Option<&BTreeMap<String, FontConfig>>) -> Vec<FontConfig> {
    let mut configs = vec![FontConfig::default()];
    if let Some(custom) = custom {
        configs.extend(custom.values().cloned());
    }
    configs
}
