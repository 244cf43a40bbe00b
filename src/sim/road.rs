//! Road geometry: lanes and death boundaries

use serde::{Deserialize, Serialize};

use crate::consts::LANE_COUNT;
use crate::tuning::ScreenTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Road {
    pub width: f32,
    pub top: f32,
    pub lane_height: f32,
    pub boundary_left: f32,
    pub boundary_right: f32,
}

impl Road {
    pub fn new(screen: &ScreenTuning) -> Self {
        Self {
            width: screen.width,
            top: screen.road_top,
            lane_height: screen.lane_height,
            boundary_left: screen.boundary_left,
            boundary_right: screen.boundary_right,
        }
    }

    pub fn lane_count(&self) -> usize {
        LANE_COUNT
    }

    /// Y of a lane's centerline
    pub fn lane_center(&self, lane: usize) -> f32 {
        self.top + (lane as f32 + 0.5) * self.lane_height
    }

    /// Lane whose band contains `y` (clamped to the road)
    pub fn lane_at(&self, y: f32) -> usize {
        if self.lane_height <= 0.0 {
            return 0;
        }
        let idx = ((y - self.top) / self.lane_height).floor();
        (idx.max(0.0) as usize).min(LANE_COUNT - 1)
    }

    /// Lateral range the player center may occupy
    pub fn lateral_bounds(&self) -> (f32, f32) {
        (self.lane_center(0), self.lane_center(LANE_COUNT - 1))
    }
}
