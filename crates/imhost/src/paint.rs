//! Turns context draw data into screen-space draw elements for the host renderer.

use std::rc::Rc;

use glam::{Affine2, Vec2};
use imhost_core::font_atlas::FONT_TEXTURE_ID_BASE;
use imhost_core::geometry::round_translation;
use imhost_core::{
    ContextIndex, ContextRegistry, DrawList, GuiContext, HostGeometry, ImHostError, Rect, Result,
    TextureId,
};

/// A vertex in host screen space, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HostVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Packed RGBA, red in the low byte.
    pub color: u32,
}

/// One draw call for the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct HostDrawElement {
    /// Name of the draw list the element came from.
    pub list: String,
    pub texture: TextureId,
    /// Screen-space scissor rect, already intersected with the surface clip.
    pub clip: Rect,
    /// Vertices of the whole draw list, shared by its elements.
    pub vertices: Rc<[HostVertex]>,
    pub indices: Vec<u32>,
}

impl HostDrawElement {
    /// Vertex data as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices[..])
    }

    /// Index data as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Counters from the last paint call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub elements: usize,
    pub vertices: usize,
    pub indices: usize,
    /// Commands skipped because their clip rect fell outside the surface.
    pub clipped_commands: usize,
}

/// Converts a context's draw lists into [`HostDrawElement`]s.
#[derive(Debug, Default)]
pub struct Painter {
    stats: PaintStats,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Paints the draw data `context` produced in `expected_frame`.
    ///
    /// `gui_render_transform` maps GUI logical space to surface-local space
    /// (usually the surface's DPI scale); `clip` is the surface's screen-space
    /// clip rect. Draw data from any other frame is rejected.
    pub fn paint(
        &mut self,
        context: &GuiContext,
        expected_frame: u64,
        geometry: &HostGeometry,
        gui_render_transform: Affine2,
        clip: Rect,
    ) -> Result<Vec<HostDrawElement>> {
        let draw_data = context.draw_data();
        if draw_data.frame != expected_frame {
            return Err(ImHostError::StaleDrawData {
                expected: expected_frame,
                actual: draw_data.frame,
            });
        }

        // Whole pixels keep text crisp; the linear part stays exact.
        let to_screen = round_translation(geometry.gui_to_screen(gui_render_transform));

        self.stats = PaintStats::default();
        let mut elements = Vec::new();
        for list in &draw_data.lists {
            self.paint_list(list, to_screen, &clip, &mut elements);
        }

        log::trace!(
            "painted context {} frame {expected_frame}: {:?}",
            context.index(),
            self.stats
        );
        Ok(elements)
    }

    /// Paints the context at `index` for the registry's current frame.
    ///
    /// Font textures must resolve to the current atlas or one still pending
    /// release.
    pub fn paint_registry(
        &mut self,
        registry: &ContextRegistry,
        index: ContextIndex,
        geometry: &HostGeometry,
        gui_render_transform: Affine2,
        clip: Rect,
    ) -> Result<Vec<HostDrawElement>> {
        let context = registry
            .get(index)
            .ok_or(ImHostError::ContextNotFound(index))?;

        for texture in context.draw_data().textures() {
            if texture.0 >= FONT_TEXTURE_ID_BASE && registry.resolve_texture(texture).is_none() {
                return Err(ImHostError::UnknownTexture(texture.0));
            }
        }

        self.paint(
            context,
            registry.frame(),
            geometry,
            gui_render_transform,
            clip,
        )
    }

    fn paint_list(
        &mut self,
        list: &DrawList,
        to_screen: Affine2,
        clip: &Rect,
        out: &mut Vec<HostDrawElement>,
    ) {
        let vertices: Rc<[HostVertex]> = list
            .vtx_buffer
            .iter()
            .map(|v| HostVertex {
                position: to_screen
                    .transform_point2(Vec2::from_array(v.pos))
                    .to_array(),
                uv: v.uv,
                color: v.col,
            })
            .collect();

        let mut used = false;
        for cmd in &list.commands {
            let cmd_clip = cmd.clip_rect.transformed(to_screen).intersection(clip);
            if cmd_clip.is_empty() {
                self.stats.clipped_commands += 1;
                continue;
            }

            let indices = list.command_indices(cmd).to_vec();
            self.stats.indices += indices.len();
            self.stats.elements += 1;
            used = true;

            out.push(HostDrawElement {
                list: list.name.clone(),
                texture: cmd.texture_id,
                clip: cmd_clip,
                vertices: Rc::clone(&vertices),
                indices,
            });
        }

        if used {
            self.stats.vertices += vertices.len();
        }
    }
}
