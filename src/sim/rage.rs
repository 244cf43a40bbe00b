//! Rage meter, shield charge and the rage camera
//!
//! Timers here are only ticked after a frame's collisions have been
//! resolved, so rage or recovery can never lapse halfway through a frame.

use serde::{Deserialize, Serialize};

use crate::tuning::RageTuning;
use crate::{ease_out_cubic, lerp};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RageState {
    /// Meter in [0, max_amount]; drains with the timer while active
    pub amount: f32,
    /// Seconds of rage remaining; 0 = inactive
    pub timer: f32,
    /// Camera zoom progress in [0, 1]
    zoom: f32,
    tuning: RageTuning,
}

impl RageState {
    pub fn new(tuning: RageTuning) -> Self {
        Self {
            amount: 0.0,
            timer: 0.0,
            zoom: 0.0,
            tuning,
        }
    }

    pub fn reset(&mut self) {
        self.amount = 0.0;
        self.timer = 0.0;
        self.zoom = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    /// Meter fill in [0, 1]
    pub fn fill(&self) -> f32 {
        if self.tuning.max_amount <= 0.0 {
            return 0.0;
        }
        (self.amount / self.tuning.max_amount).clamp(0.0, 1.0)
    }

    /// Add to the meter. Returns true if this filled it and triggered rage.
    /// Gains while rage is already running are dropped.
    pub fn add(&mut self, gain: f32) -> bool {
        if self.is_active() || gain <= 0.0 {
            return false;
        }
        self.amount = (self.amount.max(0.0) + gain).min(self.tuning.max_amount);
        if self.amount >= self.tuning.max_amount {
            self.timer = self.tuning.duration;
            log::debug!("rage activated for {:.1}s", self.timer);
            return true;
        }
        false
    }

    /// Tick the rage timer and camera. Call after collision resolution.
    pub fn tick(&mut self, dt: f32) {
        if self.is_active() {
            self.timer = (self.timer - dt).max(0.0);
            self.amount = if self.tuning.duration > 0.0 {
                self.tuning.max_amount * self.timer / self.tuning.duration
            } else {
                0.0
            };
            if !self.is_active() {
                self.amount = 0.0;
                log::debug!("rage expired");
            }
        }
        self.update_zoom(dt);
    }

    /// Zoom in while more than `zoom_duration` of rage remains, zoom out
    /// once it drops below. The zoom-out finishes as rage ends.
    fn update_zoom(&mut self, dt: f32) {
        let step = if self.tuning.zoom_duration > 0.0 {
            dt / self.tuning.zoom_duration
        } else {
            1.0
        };
        if self.timer > self.tuning.zoom_duration {
            self.zoom = (self.zoom + step).min(1.0);
        } else {
            self.zoom = (self.zoom - step).max(0.0);
        }
    }

    /// Camera zoom progress in [0, 1]
    pub fn zoom_progress(&self) -> f32 {
        self.zoom
    }

    /// Camera scale to apply (1.0 = no zoom)
    pub fn camera_scale(&self) -> f32 {
        lerp(1.0, self.tuning.zoom_scale, ease_out_cubic(self.zoom))
    }
}

/// One-hit shield plus the recovery window that follows a block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldState {
    pub charged: bool,
    /// Seconds of post-block invincibility remaining
    pub recovery: f32,
}

impl ShieldState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn grant(&mut self) {
        self.charged = true;
    }

    /// The shield absorbed a hit: spend the charge, start recovery
    pub fn absorb(&mut self, recovery: f32) {
        self.charged = false;
        self.recovery = recovery;
        log::debug!("shield absorbed a hit");
    }

    pub fn is_recovering(&self) -> bool {
        self.recovery > 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        self.recovery = (self.recovery - dt).max(0.0);
    }
}
