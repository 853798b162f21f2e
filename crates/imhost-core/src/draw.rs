//! Draw output produced by a context update.

use glam::Vec2;

use crate::geometry::Rect;

/// Opaque handle to a texture the host renderer knows how to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(pub u64);

/// A single vertex in GUI logical space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    /// Packed RGBA, red in the low byte.
    pub col: u32,
}

/// A run of indices sharing one clip rect and one texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCmd {
    pub clip_rect: Rect,
    pub texture_id: TextureId,
    pub idx_offset: u32,
    pub elem_count: u32,
}

/// Vertices, indices and commands for one window of a context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub name: String,
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<u32>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    /// Indices belonging to `cmd`.
    #[must_use]
    pub fn command_indices(&self, cmd: &DrawCmd) -> &[u32] {
        let start = cmd.idx_offset as usize;
        let end = (start + cmd.elem_count as usize).min(self.idx_buffer.len());
        &self.idx_buffer[start.min(end)..end]
    }
}

/// Everything a context drew during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawData {
    /// Registry frame number the data was produced in.
    pub frame: u64,
    pub display_size: Vec2,
    pub lists: Vec<DrawList>,
}

impl DrawData {
    pub fn total_vtx_count(&self) -> usize {
        self.lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.lists.iter().map(|l| l.idx_buffer.len()).sum()
    }

    /// Iterates every texture referenced by any command.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.lists
            .iter()
            .flat_map(|l| l.commands.iter().map(|c| c.texture_id))
    }
}

/// Records primitives into a [`DrawList`].
///
/// Consecutive primitives with the same clip rect and texture share a command.
#[derive(Debug)]
pub struct DrawListBuilder {
    list: DrawList,
    clip_stack: Vec<Rect>,
    base_clip: Rect,
    font_texture: TextureId,
}

impl DrawListBuilder {
    pub fn new(name: impl Into<String>, display_size: Vec2, font_texture: TextureId) -> Self {
        Self {
            list: DrawList {
                name: name.into(),
                ..Default::default()
            },
            clip_stack: Vec::new(),
            base_clip: Rect::new(Vec2::ZERO, display_size),
            font_texture,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.list.name
    }

    /// Current clip rect.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(self.base_clip)
    }

    /// Pushes a clip rect, intersected with the current one.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        let clip = self.clip_rect().intersection(&rect);
        self.clip_stack.push(clip);
    }

    pub fn pop_clip_rect(&mut self) {
        if self.clip_stack.pop().is_none() {
            log::warn!("pop_clip_rect on '{}' with empty clip stack", self.list.name);
        }
    }

    /// Filled axis-aligned rectangle, textured with the font atlas white texel.
    pub fn add_rect_filled(&mut self, min: Vec2, max: Vec2, col: u32) {
        self.add_quad(self.font_texture, min, max, Vec2::ZERO, Vec2::ZERO, col);
    }

    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, col: u32) {
        let base = self.begin_primitive(self.font_texture, 3);
        for p in [a, b, c] {
            self.list.vtx_buffer.push(DrawVert {
                pos: p.to_array(),
                uv: [0.0, 0.0],
                col,
            });
        }
        self.list
            .idx_buffer
            .extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Textured rectangle.
    pub fn add_image(
        &mut self,
        texture: TextureId,
        min: Vec2,
        max: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        col: u32,
    ) {
        self.add_quad(texture, min, max, uv_min, uv_max, col);
    }

    /// Finishes recording. Lists with no geometry come back empty.
    #[must_use]
    pub fn finish(self) -> DrawList {
        self.list
    }

    fn add_quad(
        &mut self,
        texture: TextureId,
        min: Vec2,
        max: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        col: u32,
    ) {
        let base = self.begin_primitive(texture, 6);
        let corners = [
            (min, uv_min),
            (Vec2::new(max.x, min.y), Vec2::new(uv_max.x, uv_min.y)),
            (max, uv_max),
            (Vec2::new(min.x, max.y), Vec2::new(uv_min.x, uv_max.y)),
        ];
        for (pos, uv) in corners {
            self.list.vtx_buffer.push(DrawVert {
                pos: pos.to_array(),
                uv: uv.to_array(),
                col,
            });
        }
        self.list.idx_buffer.extend_from_slice(&[
            base,
            base + 1,
            base + 2,
            base,
            base + 2,
            base + 3,
        ]);
    }

    /// Makes sure the last command matches the clip rect and texture, then
    /// accounts for `elem_count` more indices. Returns the first new vertex index.
    fn begin_primitive(&mut self, texture: TextureId, elem_count: u32) -> u32 {
        let clip_rect = self.clip_rect();
        let idx_offset = u32::try_from(self.list.idx_buffer.len()).unwrap_or(u32::MAX);

        match self.list.commands.last_mut() {
            Some(cmd) if cmd.clip_rect == clip_rect && cmd.texture_id == texture => {
                cmd.elem_count += elem_count;
            }
            _ => self.list.commands.push(DrawCmd {
                clip_rect,
                texture_id: texture,
                idx_offset,
                elem_count,
            }),
        }

        u32::try_from(self.list.vtx_buffer.len()).unwrap_or(u32::MAX)
    }
}
