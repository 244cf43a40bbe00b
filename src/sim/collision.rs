//! Collision primitives for lane hazards
//!
//! Three hazard shapes meet two probe shapes:
//! - crash and slow hazards are axis-aligned boxes
//! - cars are ellipses (a bottom-aligned fraction of the sprite)
//! - the player and ranged shots are circles, melee swings are boxes
//!
//! Every test returns the contact point on a hit so callers can place
//! explosions and pickups.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from top-left corner and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Axis-aligned ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vec2,
    /// Semi-axes (half width, half height)
    pub radii: Vec2,
}

impl Ellipse {
    /// Hitbox ellipse for a sprite at `pos` with `size`, scaled by `fraction`
    /// and aligned to the sprite's bottom edge.
    pub fn bottom_aligned(pos: Vec2, size: Vec2, fraction: Vec2) -> Self {
        let radii = size * fraction * 0.5;
        let center = Vec2::new(pos.x + size.x * 0.5, pos.y + size.y - radii.y);
        Self { center, radii }
    }

    /// Offset from the center expressed in unit-circle space
    #[inline]
    fn to_unit(&self, p: Vec2) -> Option<Vec2> {
        if self.radii.x <= 0.0 || self.radii.y <= 0.0 {
            return None;
        }
        Some((p - self.center) / self.radii)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.to_unit(p).is_some_and(|u| u.length_squared() <= 1.0)
    }
}

/// A shape tested against hazards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    Circle { center: Vec2, radius: f32 },
    Rect(Aabb),
}

/// Circle vs box: clamp the center into the box, compare squared distance
pub fn circle_aabb(center: Vec2, radius: f32, aabb: &Aabb) -> Option<Vec2> {
    let closest = aabb.clamp_point(center);
    if center.distance_squared(closest) <= radius * radius {
        Some(closest)
    } else {
        None
    }
}

/// Circle vs ellipse.
///
/// The offset is mapped into the ellipse's unit-circle space by dividing by
/// the semi-axes. The circle's radius is normalised along the same direction,
/// so a circle touching the flat side of an eccentric ellipse uses a larger
/// normalised radius than one touching the long side.
pub fn circle_ellipse(center: Vec2, radius: f32, ellipse: &Ellipse) -> Option<Vec2> {
    let unit = ellipse.to_unit(center)?;
    let dist = unit.length();
    if dist <= f32::EPSILON {
        return Some(ellipse.center);
    }

    let dir = (center - ellipse.center).normalize_or_zero();
    let norm_radius = radius * (dir / ellipse.radii).length();
    if dist <= 1.0 + norm_radius {
        let boundary = ellipse.center + (unit / dist) * ellipse.radii;
        Some(boundary)
    } else {
        None
    }
}

/// Box vs box
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> Option<Vec2> {
    if a.overlaps(b) {
        let min = a.min.max(b.min);
        let max = a.max.min(b.max);
        Some((min + max) * 0.5)
    } else {
        None
    }
}

/// Ellipse vs box: the box point closest to the ellipse center must lie
/// inside the ellipse.
pub fn ellipse_aabb(ellipse: &Ellipse, aabb: &Aabb) -> Option<Vec2> {
    let closest = aabb.clamp_point(ellipse.center);
    if ellipse.contains(closest) {
        Some(closest)
    } else {
        None
    }
}

/// Probe vs box
pub fn probe_aabb(probe: &Probe, aabb: &Aabb) -> Option<Vec2> {
    match probe {
        Probe::Circle { center, radius } => circle_aabb(*center, *radius, aabb),
        Probe::Rect(rect) => aabb_aabb(rect, aabb),
    }
}

/// Probe vs ellipse
pub fn probe_ellipse(probe: &Probe, ellipse: &Ellipse) -> Option<Vec2> {
    match probe {
        Probe::Circle { center, radius } => circle_ellipse(*center, *radius, ellipse),
        Probe::Rect(rect) => ellipse_aabb(ellipse, rect),
    }
}
