//! Contact resolution between the moving body and level surfaces
//!
//! Flat surfaces use a four-way minimum-penetration box test. Slanted
//! surfaces (and anything with a hole) are one-way girders: the body can
//! only land on them from above, and passes through everywhere else.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::surface::{Rect, Surface};
use crate::consts::CONTACT_EPSILON;

/// Outcome of resolving the body against one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    None,
    LandedOnTop,
    /// Head bonk against the underside
    HitBottom,
    HitSide,
}

/// Penetration depth along each axis direction, measured as positive overlap
#[derive(Debug, Clone, Copy)]
struct Penetration {
    /// Body's right edge past the surface's left edge
    left: f32,
    /// Surface's right edge past the body's left edge
    right: f32,
    /// Body's top past the surface's bottom
    top: f32,
    /// Surface's top past the body's bottom
    bottom: f32,
}

impl Penetration {
    fn between(body: &Rect, surface: &Rect) -> Option<Self> {
        if !body.intersects(surface) {
            return None;
        }
        Some(Self {
            left: body.right() - surface.left(),
            right: surface.right() - body.left(),
            top: body.top() - surface.bottom(),
            bottom: surface.top() - body.bottom(),
        })
    }

    fn min(&self) -> f32 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }
}

/// Resolve the body box against a flat surface
///
/// Ties between equal penetrations resolve vertical before horizontal, in
/// the order bottom, top, left, right.
pub fn resolve_flat(pos: &mut Vec2, vel: &mut Vec2, size: Vec2, surface: &Surface) -> Contact {
    if surface.is_degenerate() {
        return Contact::None;
    }
    let s = surface.rect;
    let Some(pen) = Penetration::between(&Rect::at(*pos, size), &s) else {
        return Contact::None;
    };
    let min = pen.min();

    if min == pen.bottom && vel.y <= 0.0 {
        pos.y = s.top();
        vel.y = 0.0;
        return Contact::LandedOnTop;
    }
    if min == pen.top && vel.y > 0.0 {
        pos.y = s.bottom() - size.y;
        vel.y = 0.0;
        return Contact::HitBottom;
    }
    if min == pen.left {
        pos.x = s.left() - size.x - CONTACT_EPSILON;
        vel.x = -vel.x.abs();
        return Contact::HitSide;
    }
    if min == pen.right {
        pos.x = s.right() + CONTACT_EPSILON;
        vel.x = vel.x.abs();
        return Contact::HitSide;
    }
    Contact::None
}

/// Resolve the body's foot against a slanted (or holed) surface
///
/// The foot is the bottom-center of the body. A landing needs the foot at or
/// above the surface on the previous step, at or below it now, a non-rising
/// body, and solid ground under the foot.
///
/// `snap` is zero for an airborne body, so it must cross the surface
/// exactly. A grounded body passes its snap distance, which widens both
/// tests so it follows the slope and keeps its footing after a sideways push.
pub fn resolve_slanted(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    prev_pos: Vec2,
    surface: &Surface,
    snap: f32,
) -> Contact {
    if surface.is_degenerate() || vel.y > 0.0 {
        return Contact::None;
    }

    let foot_x = pos.x + size.x / 2.0;
    if !surface.spans_x(foot_x) || surface.in_hole(foot_x) {
        return Contact::None;
    }

    let prev_foot_x = prev_pos.x + size.x / 2.0;
    let was_above = prev_pos.y >= surface.surface_y_at(prev_foot_x) - snap;
    let surface_y = surface.surface_y_at(foot_x);
    let is_below = pos.y <= surface_y + snap;

    if was_above && is_below {
        pos.y = surface_y;
        vel.y = 0.0;
        Contact::LandedOnTop
    } else {
        Contact::None
    }
}

/// Resolve against any surface, dispatching on its shape
pub fn resolve(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    prev_pos: Vec2,
    surface: &Surface,
    snap: f32,
) -> Contact {
    if surface.uses_slope_contact() {
        resolve_slanted(pos, vel, size, prev_pos, surface, snap)
    } else {
        resolve_flat(pos, vel, size, surface)
    }
}

/// Whether a body box rests exactly on top of a flat surface
///
/// The strict overlap test never reports a body standing flush on a top
/// edge, so grounded bodies probe for support separately.
pub fn rests_on(pos: Vec2, size: Vec2, surface: &Surface) -> bool {
    if surface.is_degenerate() || surface.uses_slope_contact() {
        return false;
    }
    let body = Rect::at(pos, size);
    body.x_overlap(&surface.rect) > 0.0 && (body.bottom() - surface.rect.top()).abs() <= CONTACT_EPSILON
}
