//! 2D geometry shared by input routing and painting.
//!
//! Transforms follow "apply first, then second" naming: [`concatenate`]`(a, b)`
//! maps a point through `a` and then through `b`.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// Composes two transforms so that `first` is applied before `then`.
#[must_use]
pub fn concatenate(first: Affine2, then: Affine2) -> Affine2 {
    then * first
}

/// Returns `transform` with its translation rounded to whole pixels.
///
/// The linear part is kept as is so scaled content does not drift.
#[must_use]
pub fn round_translation(transform: Affine2) -> Affine2 {
    Affine2 {
        matrix2: transform.matrix2,
        translation: transform.translation.round(),
    }
}

/// Geometry reported by the host for an on-screen surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostGeometry {
    /// Size of the surface in its own local space.
    pub local_size: Vec2,
    /// Transform from surface-local space to screen space, accumulated over
    /// every container the surface is nested in.
    pub accumulated_render_transform: Affine2,
}

impl Default for HostGeometry {
    fn default() -> Self {
        Self {
            local_size: Vec2::ZERO,
            accumulated_render_transform: Affine2::IDENTITY,
        }
    }
}

impl HostGeometry {
    /// Creates geometry for a surface of the given size placed with `render_transform`.
    #[must_use]
    pub fn new(local_size: Vec2, render_transform: Affine2) -> Self {
        Self {
            local_size,
            accumulated_render_transform: render_transform,
        }
    }

    /// Maps a surface-local point to screen space.
    #[must_use]
    pub fn local_to_screen(&self, point: Vec2) -> Vec2 {
        self.accumulated_render_transform.transform_point2(point)
    }

    /// Returns the transform from GUI logical space to screen space.
    #[must_use]
    pub fn gui_to_screen(&self, gui_transform: Affine2) -> Affine2 {
        concatenate(gui_transform, self.accumulated_render_transform)
    }

    /// Maps a screen-space point into GUI logical space.
    ///
    /// This is the exact inverse of [`HostGeometry::gui_to_screen`]; any scale,
    /// rotation or translation added by nested containers is undone.
    #[must_use]
    pub fn screen_to_gui(&self, gui_transform: Affine2, point: Vec2) -> Vec2 {
        self.gui_to_screen(gui_transform)
            .inverse()
            .transform_point2(point)
    }
}

/// Axis-aligned rectangle described by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// A rectangle that contains everything.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            min: Vec2::splat(f32::MIN),
            max: Vec2::splat(f32::MAX),
        }
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        (self.max - self.min).max(Vec2::ZERO)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmplt(self.max).all()
    }

    /// Overlap of two rectangles. May be empty.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Bounding box of this rectangle after `transform`.
    #[must_use]
    pub fn transformed(&self, transform: Affine2) -> Rect {
        let corners = [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
        .map(|c| transform.transform_point2(c));

        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        Rect { min, max }
    }
}
