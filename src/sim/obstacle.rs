//! Hazard entities
//!
//! Obstacles are pooled: a slot is reused once it scrolls off-screen or is
//! destroyed. Each variant carries only the data it needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Ellipse, Probe, circle_aabb, circle_ellipse, ellipse_aabb};
use super::collision::{probe_aabb, probe_ellipse};

/// Hazard type without payload, used for spawn decisions and hit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleType {
    /// Solid block: lethal on contact
    Crash,
    /// Drag zone: slows the player while overlapping, never destroyed by contact
    Slow,
    /// Slower-moving vehicle: lethal, explodes and lingers when destroyed
    Car,
}

/// Per-variant payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Crash,
    Slow,
    Car {
        /// Cosmetic skin index (unseeded)
        skin: u8,
        /// Seconds left in the death animation; `Some` once destroyed
        linger: Option<f32>,
    },
}

impl ObstacleKind {
    pub fn ty(&self) -> ObstacleType {
        match self {
            ObstacleKind::Crash => ObstacleType::Crash,
            ObstacleKind::Slow => ObstacleType::Slow,
            ObstacleKind::Car { .. } => ObstacleType::Car,
        }
    }
}

/// Collision shape of an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hitbox {
    Box(Aabb),
    Ellipse(Ellipse),
}

impl Hitbox {
    pub fn hit_by(&self, probe: &Probe) -> Option<Vec2> {
        match self {
            Hitbox::Box(aabb) => probe_aabb(probe, aabb),
            Hitbox::Ellipse(ellipse) => probe_ellipse(probe, ellipse),
        }
    }

    pub fn hit_by_circle(&self, center: Vec2, radius: f32) -> Option<Vec2> {
        match self {
            Hitbox::Box(aabb) => circle_aabb(center, radius, aabb),
            Hitbox::Ellipse(ellipse) => circle_ellipse(center, radius, ellipse),
        }
    }
}

/// A pooled hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner in screen space
    pub pos: Vec2,
    pub size: Vec2,
    pub lane: usize,
    pub active: bool,
}

impl Obstacle {
    /// An empty pool slot
    pub fn inactive() -> Self {
        Self {
            kind: ObstacleKind::Crash,
            pos: Vec2::ZERO,
            size: Vec2::ZERO,
            lane: 0,
            active: false,
        }
    }

    pub fn ty(&self) -> ObstacleType {
        self.kind.ty()
    }

    /// Destroyed car still playing its death animation
    pub fn is_dying(&self) -> bool {
        matches!(self.kind, ObstacleKind::Car { linger: Some(_), .. })
    }

    /// Eligible for any new collision check
    pub fn can_collide(&self) -> bool {
        self.active && !self.is_dying()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Collision shape; cars use a bottom-aligned ellipse covering
    /// `car_hitbox` of the sprite.
    pub fn hitbox(&self, car_hitbox: Vec2) -> Hitbox {
        match self.kind {
            ObstacleKind::Car { .. } => {
                Hitbox::Ellipse(Ellipse::bottom_aligned(self.pos, self.size, car_hitbox))
            }
            _ => Hitbox::Box(self.bounds()),
        }
    }

    /// Leftward scroll speed (px/s). Cars drive forward, so they close in
    /// slower than the road.
    pub fn scroll_speed(&self, road_speed: f32, car_scroll_factor: f32) -> f32 {
        scroll_speed_for(self.ty(), road_speed, car_scroll_factor)
    }

    pub fn is_off_screen_left(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    /// Begin the car death animation. Returns false if this is not a live car.
    pub fn start_linger(&mut self, seconds: f32) -> bool {
        match &mut self.kind {
            ObstacleKind::Car { linger, .. } if linger.is_none() => {
                *linger = Some(seconds.max(0.0));
                true
            }
            _ => false,
        }
    }

    /// Count down the death animation; frees the slot when it runs out
    pub fn tick_linger(&mut self, dt: f32) {
        if let ObstacleKind::Car {
            linger: Some(remaining),
            ..
        } = &mut self.kind
        {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.active = false;
            }
        }
    }
}

/// Leftward scroll speed for a hazard type
pub fn scroll_speed_for(ty: ObstacleType, road_speed: f32, car_scroll_factor: f32) -> f32 {
    match ty {
        ObstacleType::Car => road_speed * car_scroll_factor,
        _ => road_speed,
    }
}

/// Car vs crash overlap: car ellipse against crash box
pub fn car_hits_crash(car: &Obstacle, crash: &Obstacle, car_hitbox: Vec2) -> Option<Vec2> {
    match car.hitbox(car_hitbox) {
        Hitbox::Ellipse(ellipse) => ellipse_aabb(&ellipse, &crash.bounds()),
        Hitbox::Box(aabb) => super::collision::aabb_aabb(&aabb, &crash.bounds()),
    }
}
