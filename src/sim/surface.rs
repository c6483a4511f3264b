//! Surface geometry for platforms, girders and walls
//!
//! Coordinates are world units with Y pointing up. A surface is a box
//! anchored at its bottom-left corner; a slanted surface shears that box by
//! `rise` between its left and right edge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size at a bottom-left position
    pub fn at(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.bottom() < other.top()
            && self.top() > other.bottom()
    }

    /// Length of the shared X interval (zero or negative when disjoint)
    #[inline]
    pub fn x_overlap(&self, other: &Rect) -> f32 {
        self.right().min(other.right()) - self.left().max(other.left())
    }

    /// Grow by `px` on the left and right and `py` on the bottom and top
    pub fn expanded(&self, px: f32, py: f32) -> Rect {
        Rect::new(self.x - px, self.y - py, self.w + 2.0 * px, self.h + 2.0 * py)
    }

    /// Zero or negative area
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }
}

/// What a surface is for (drives rendering and generator bookkeeping only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// Full-width floor of chunk 0
    Ground,
    /// Step on one of the braided paths
    Platform,
    /// Off-path platform
    Decoy,
    /// Short vertical cover segment
    Wall,
}

/// A gap in local-X space, `[x, x + width)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub x: f32,
    pub width: f32,
}

impl Hole {
    #[inline]
    pub fn contains(&self, local_x: f32) -> bool {
        local_x >= self.x && local_x < self.x + self.width
    }
}

/// An immutable piece of level geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub kind: SurfaceKind,
    /// Box at the left edge (x, bottom, width, thickness)
    pub rect: Rect,
    /// Height gained from the left edge to the right edge
    pub rise: f32,
    pub hole: Option<Hole>,
}

impl Surface {
    /// Flat axis-aligned surface
    pub fn flat(kind: SurfaceKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            rise: 0.0,
            hole: None,
        }
    }

    /// Slanted surface whose top passes through `(center_x, center_top)`
    ///
    /// The rise is split across both halves so the middle of the tilt sits
    /// exactly on the requested point.
    pub fn slanted_from_center(
        kind: SurfaceKind,
        center_x: f32,
        center_top: f32,
        width: f32,
        thickness: f32,
        rise: f32,
    ) -> Self {
        let rect = Rect::new(
            center_x - width / 2.0,
            center_top - thickness - rise / 2.0,
            width,
            thickness,
        );
        Self {
            kind,
            rect,
            rise,
            hole: None,
        }
    }

    /// Attach a hole (local X relative to the left edge)
    pub fn with_hole(mut self, x: f32, width: f32) -> Self {
        self.hole = Some(Hole { x, width });
        self
    }

    /// Whether contacts use the slope test instead of the four-way box test
    pub fn uses_slope_contact(&self) -> bool {
        self.rise != 0.0 || self.hole.is_some()
    }

    pub fn is_degenerate(&self) -> bool {
        self.rect.is_degenerate()
    }

    /// Top height at a world X, interpolated across the surface and clamped to its span
    pub fn surface_y_at(&self, world_x: f32) -> f32 {
        let top = self.rect.top();
        if self.rect.w <= 0.0 {
            return top;
        }
        let t = ((world_x - self.rect.x) / self.rect.w).clamp(0.0, 1.0);
        top + self.rise * t
    }

    /// Whether a world X falls inside the hole
    pub fn in_hole(&self, world_x: f32) -> bool {
        self.hole
            .is_some_and(|hole| hole.contains(world_x - self.rect.x))
    }

    /// Whether a world X lies over the surface's horizontal span
    pub fn spans_x(&self, world_x: f32) -> bool {
        world_x >= self.rect.left() && world_x <= self.rect.right()
    }

    /// Bounding box including the slant
    pub fn bounds(&self) -> Rect {
        let low = self.rise.min(0.0);
        Rect::new(
            self.rect.x,
            self.rect.y + low,
            self.rect.w,
            self.rect.h + self.rise.abs(),
        )
    }
}
