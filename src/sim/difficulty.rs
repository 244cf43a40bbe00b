//! Difficulty ramp
//!
//! Pure function of elapsed play time. Everything that scales with
//! difficulty (wave size, wave interval, hazard mix, road speed) reads this.

use crate::lerp;
use crate::tuning::DifficultyTuning;

#[derive(Debug, Clone)]
pub struct DifficultyRamp {
    ramp_seconds: f32,
    base_road_speed: f32,
    max_road_speed: f32,
}

impl DifficultyRamp {
    pub fn new(tuning: &DifficultyTuning) -> Self {
        Self {
            ramp_seconds: tuning.ramp_seconds,
            base_road_speed: tuning.base_road_speed,
            max_road_speed: tuning.max_road_speed,
        }
    }

    /// Difficulty in [0, 1] after `elapsed` seconds of play.
    ///
    /// Smoothstep over the ramp so the first waves stay gentle and the top
    /// end flattens out instead of snapping.
    pub fn factor(&self, elapsed: f32) -> f32 {
        if self.ramp_seconds <= 0.0 {
            return 1.0;
        }
        let t = (elapsed.max(0.0) / self.ramp_seconds).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Road scroll speed (px/s) at a given difficulty
    pub fn road_speed(&self, difficulty: f32) -> f32 {
        lerp(
            self.base_road_speed,
            self.max_road_speed,
            difficulty.clamp(0.0, 1.0),
        )
    }
}
