//! A single GUI context: input queue, clock, draw callbacks and draw output.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

use crate::delegate::{DelegateHandle, Multicast};
use crate::draw::{DrawData, DrawList, DrawListBuilder, TextureId};
use crate::input::{InputQueue, InputState, MouseCursor};
use crate::owner::ContextIndex;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a context instance.
///
/// Two contexts registered under the same index at different times have
/// different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

/// Callback drawing into one context.
pub type DrawCallback = dyn FnMut(&mut Frame<'_>);

/// Callback drawing into every context; receives the context index.
pub type MultiContextDrawCallback = dyn FnMut(ContextIndex, &mut Frame<'_>);

/// Per-frame view handed to draw callbacks.
pub struct Frame<'a> {
    index: ContextIndex,
    io: &'a InputState,
    display_size: Vec2,
    dpi_scale: f32,
    font_texture: TextureId,
    time: f64,
    lists: Vec<DrawListBuilder>,
    mouse_cursor: MouseCursor,
}

impl<'a> Frame<'a> {
    fn new(context: &'a GuiContext) -> Self {
        Self {
            index: context.index,
            io: &context.io,
            display_size: context.display_size,
            dpi_scale: context.dpi_scale,
            font_texture: context.font_texture,
            time: context.time,
            lists: Vec::new(),
            mouse_cursor: MouseCursor::Default,
        }
    }

    pub fn context_index(&self) -> ContextIndex {
        self.index
    }

    /// Input accumulated for this frame.
    pub fn io(&self) -> &InputState {
        self.io
    }

    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn dpi_scale(&self) -> f32 {
        self.dpi_scale
    }

    /// Texture of the font atlas current for this frame.
    pub fn font_texture(&self) -> TextureId {
        self.font_texture
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Requests a cursor shape. The last request in a frame wins.
    pub fn set_mouse_cursor(&mut self, cursor: MouseCursor) {
        self.mouse_cursor = cursor;
    }

    /// Draw list for the window called `name`, created on first use this frame.
    pub fn draw_list(&mut self, name: &str) -> &mut DrawListBuilder {
        let position = match self.lists.iter().position(|l| l.name() == name) {
            Some(position) => position,
            None => {
                self.lists.push(DrawListBuilder::new(
                    name,
                    self.display_size,
                    self.font_texture,
                ));
                self.lists.len() - 1
            }
        };
        &mut self.lists[position]
    }

    fn finish(self) -> (Vec<DrawList>, MouseCursor) {
        let lists = self
            .lists
            .into_iter()
            .map(DrawListBuilder::finish)
            .filter(|l| !l.idx_buffer.is_empty())
            .collect();
        (lists, self.mouse_cursor)
    }
}

/// An isolated GUI state machine owned by one logical owner.
pub struct GuiContext {
    id: ContextId,
    index: ContextIndex,
    name: String,
    dpi_scale: f32,
    display_size: Vec2,
    time: f64,
    frame_count: u64,
    font_texture: TextureId,
    io: InputState,
    input_queue: InputQueue,
    draw_callbacks: Multicast<DrawCallback>,
    draw_data: DrawData,
    mouse_cursor: MouseCursor,
}

impl GuiContext {
    pub(crate) fn new(
        index: ContextIndex,
        name: impl Into<String>,
        font_texture: TextureId,
        dpi_scale: f32,
    ) -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            index,
            name: name.into(),
            dpi_scale,
            display_size: Vec2::ZERO,
            time: 0.0,
            frame_count: 0,
            font_texture,
            io: InputState::default(),
            input_queue: InputQueue::new(),
            draw_callbacks: Multicast::new(),
            draw_data: DrawData::default(),
            mouse_cursor: MouseCursor::Default,
        }
    }

    /// Unique id; a context recreated under the same index gets a new one.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Registry index this context lives under.
    pub fn index(&self) -> ContextIndex {
        self.index
    }

    /// Name given at creation, e.g. `PIEContext0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DPI scale fonts are built at.
    pub fn dpi_scale(&self) -> f32 {
        self.dpi_scale
    }

    /// Seconds of GUI time accumulated over all updates.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of updates this context went through.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Font atlas texture this context last resolved.
    pub fn font_texture(&self) -> TextureId {
        self.font_texture
    }

    /// Size of the GUI canvas in logical units. Draw lists are clipped to it.
    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    /// Sets the canvas size; negative components are clamped to zero.
    pub fn set_display_size(&mut self, size: Vec2) {
        self.display_size = size.max(Vec2::ZERO);
    }

    /// Input state as of the last update.
    pub fn io(&self) -> &InputState {
        &self.io
    }

    /// Queue that input handlers push events into.
    pub fn input_queue(&self) -> &InputQueue {
        &self.input_queue
    }

    pub fn input_queue_mut(&mut self) -> &mut InputQueue {
        &mut self.input_queue
    }

    /// Draw output of the last update.
    pub fn draw_data(&self) -> &DrawData {
        &self.draw_data
    }

    /// Cursor shape requested during the last update.
    pub fn mouse_cursor(&self) -> MouseCursor {
        self.mouse_cursor
    }

    /// Adds a callback run on every update of this context.
    pub fn add_draw_callback<F>(&mut self, callback: F) -> DelegateHandle
    where
        F: FnMut(&mut Frame<'_>) + 'static,
    {
        self.draw_callbacks.add(Box::new(callback))
    }

    /// Removes a callback added with [`GuiContext::add_draw_callback`].
    pub fn remove_draw_callback(&mut self, handle: DelegateHandle) -> bool {
        self.draw_callbacks.remove(handle)
    }

    pub(crate) fn set_dpi_scale(&mut self, scale: f32) {
        self.dpi_scale = scale;
    }

    pub(crate) fn refresh_font_texture(&mut self, texture: TextureId) {
        self.font_texture = texture;
    }

    /// Runs one frame: advances the clock, applies queued input, runs draw
    /// callbacks and stores the resulting draw data tagged with `frame_number`.
    pub(crate) fn update(
        &mut self,
        delta_seconds: f32,
        frame_number: u64,
        font_texture: TextureId,
        shared_callbacks: &mut Multicast<MultiContextDrawCallback>,
    ) {
        self.font_texture = font_texture;
        self.time += f64::from(delta_seconds);
        self.frame_count += 1;

        self.io.begin_frame(delta_seconds);
        for event in self.input_queue.drain() {
            self.io.apply(event);
        }

        let (lists, cursor) = {
            let mut draw_callbacks = std::mem::take(&mut self.draw_callbacks);
            let mut frame = Frame::new(self);
            for callback in draw_callbacks.iter_mut() {
                callback(&mut frame);
            }
            for callback in shared_callbacks.iter_mut() {
                callback(self.index, &mut frame);
            }
            let finished = frame.finish();
            self.draw_callbacks = draw_callbacks;
            finished
        };

        self.draw_data = DrawData {
            frame: frame_number,
            display_size: self.display_size,
            lists,
        };
        self.mouse_cursor = cursor;
    }
}

impl std::fmt::Debug for GuiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiContext")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("name", &self.name)
            .field("frame_count", &self.frame_count)
            .field("queued_input", &self.input_queue.len())
            .finish_non_exhaustive()
    }
}
