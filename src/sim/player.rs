//! Player kinetics
//!
//! Forward motion is a single smoothed scalar, `speed_multiplier`, relative
//! to the road: 1.0 holds position, less drifts left toward the death
//! boundary, more drifts right. Lateral (lane) motion is an independent
//! channel driven by arrows or a pointer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::road::Road;
use crate::tuning::KineticsTuning;
use crate::{approach_exp, lerp};

/// Which lateral input currently steers the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LateralSource {
    #[default]
    Pointer,
    Arrows,
}

/// Per-frame kinetics input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KineticsInput {
    /// Hold (accelerate) is down
    pub hold: bool,
    /// A discrete tap happened this frame
    pub tap: bool,
    /// -1 up, 0 none, 1 down
    pub arrow: i8,
    /// Pointer/touch lateral target (screen y), if any
    pub pointer_target: Option<f32>,
    /// Player overlaps a slow zone this frame
    pub in_slow: bool,
}

/// What happened during a kinetics update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KineticsOutcome {
    /// Horizontal displacement this frame
    pub drift: f32,
    /// Forward distance covered this frame (for scoring)
    pub distance: f32,
    /// The player hit a boundary while vulnerable this frame
    pub boundary_death: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub radius: f32,
    /// Speed as a multiple of road speed; read through `speed_multiplier()`
    pub speed_multiplier: f32,
    /// Decaying tap accumulator; read through `tap_pressure()`
    pub tap_pressure: f32,
    /// Counts down after release; deceleration waits for it to reach zero
    pub grace_timer: f32,
    pub alive: bool,
    /// Set by the run state machine during rage/shield/recovery windows
    pub invincible: bool,
    pub lateral_source: LateralSource,
    /// Last reported pointer row; steered toward while the pointer has control
    last_pointer: Option<f32>,
    tuning: KineticsTuning,
}

impl Player {
    pub fn new(tuning: KineticsTuning, road: &Road) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            radius: tuning.player_radius,
            speed_multiplier: 0.0,
            tap_pressure: 0.0,
            grace_timer: 0.0,
            alive: true,
            invincible: false,
            lateral_source: LateralSource::default(),
            last_pointer: None,
            tuning,
        };
        player.reset(road);
        player
    }

    /// Back to the start line, stationary and alive
    pub fn reset(&mut self, road: &Road) {
        let lane = road.lane_count() / 2;
        self.pos = Vec2::new(self.tuning.start_x, road.lane_center(lane));
        self.speed_multiplier = 0.0;
        self.tap_pressure = 0.0;
        self.grace_timer = 0.0;
        self.alive = true;
        self.invincible = false;
        self.lateral_source = LateralSource::default();
        self.last_pointer = None;
    }

    pub fn speed_multiplier(&self) -> f32 {
        clamp_finite(self.speed_multiplier, 0.0, self.tuning.max_speed_multiplier)
    }

    pub fn tap_pressure(&self) -> f32 {
        clamp_finite(self.tap_pressure, 0.0, 1.0)
    }

    /// Player forward speed in px/s
    pub fn actual_speed(&self, road_speed: f32) -> f32 {
        self.speed_multiplier() * road_speed.max(0.0)
    }

    pub fn lane(&self, road: &Road) -> usize {
        road.lane_at(self.pos.y)
    }

    /// Record death from a hazard. Returns true only on the first call per run.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    /// Speed target for this frame
    fn target_multiplier(&self, input_active: bool, in_slow: bool) -> f32 {
        let k = &self.tuning;
        let target = if !input_active {
            if self.grace_timer > 0.0 {
                // Grace window: keep whatever speed we had
                self.speed_multiplier()
            } else {
                0.0
            }
        } else if self.tap_pressure() > 0.0 {
            lerp(k.hold_multiplier, k.max_speed_multiplier, self.tap_pressure())
        } else {
            k.hold_multiplier
        };
        if in_slow { target * k.slow_drag } else { target }
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        input: &KineticsInput,
        road_speed: f32,
        road: &Road,
        dt: f32,
    ) -> KineticsOutcome {
        let dt = dt.max(0.0);
        let k = self.tuning.clone();

        // Tap pressure: add per tap, decay continuously
        let mut pressure = self.tap_pressure();
        if input.tap {
            pressure = (pressure + k.tap_increment).min(1.0);
        }
        self.tap_pressure = (pressure - k.tap_decay * dt).max(0.0);

        let input_active = input.hold || input.tap || self.tap_pressure > 0.0;
        if input_active {
            self.grace_timer = k.release_grace;
        } else {
            self.grace_timer = (self.grace_timer - dt).max(0.0);
        }

        let current = self.speed_multiplier();
        let target = self.target_multiplier(input_active, input.in_slow);
        let rate = if target > current {
            k.accel_rate
        } else if target <= 0.0 {
            k.stop_rate
        } else {
            k.ease_down_rate
        };
        self.speed_multiplier =
            approach_exp(current, target, rate, dt).clamp(0.0, k.max_speed_multiplier);

        let road_speed = road_speed.max(0.0);
        let actual = self.actual_speed(road_speed);
        let drift = (actual - road_speed) * dt;
        self.pos.x += drift;

        self.update_lateral(input, road, dt);

        let mut outcome = KineticsOutcome {
            drift,
            distance: actual * dt,
            boundary_death: false,
        };

        // Boundaries always clamp; they only kill a vulnerable player
        let at_boundary = self.pos.x <= road.boundary_left || self.pos.x >= road.boundary_right;
        if at_boundary {
            self.pos.x = self.pos.x.clamp(road.boundary_left, road.boundary_right);
            if !self.invincible && self.alive {
                self.alive = false;
                outcome.boundary_death = true;
            }
        }
        outcome
    }

    fn update_lateral(&mut self, input: &KineticsInput, road: &Road, dt: f32) {
        if input.arrow != 0 {
            self.lateral_source = LateralSource::Arrows;
        } else if let Some(target) = input.pointer_target {
            // Pointer takes back control once it moves
            if self.last_pointer.is_some_and(|last| last != target) {
                self.lateral_source = LateralSource::Pointer;
            }
        }
        if input.pointer_target.is_some() {
            self.last_pointer = input.pointer_target;
        }

        match self.lateral_source {
            LateralSource::Arrows => {
                self.pos.y += f32::from(input.arrow.signum()) * self.tuning.arrow_speed * dt;
            }
            LateralSource::Pointer => {
                // Keep steering toward the last reported target
                if let Some(target) = self.last_pointer {
                    self.pos.y = approach_exp(self.pos.y, target, self.tuning.pointer_rate, dt);
                }
            }
        }

        let (top, bottom) = road.lateral_bounds();
        self.pos.y = self.pos.y.clamp(top, bottom);
    }
}

/// Clamp, mapping NaN to the lower bound
fn clamp_finite(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

/// Ratio of player speed to road speed.
///
/// A stopped road yields 1.0 for a stopped player (keeping pace) and 0.0
/// otherwise, never NaN or infinity.
pub fn speed_ratio(actual: f32, road_speed: f32) -> f32 {
    if road_speed <= 0.0 {
        if actual <= 0.0 { 1.0 } else { 0.0 }
    } else {
        actual / road_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ScreenTuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;
    const ROAD_SPEED: f32 = 690.0;

    fn setup() -> (Player, Road) {
        let road = Road::new(&ScreenTuning::default());
        (Player::new(KineticsTuning::default(), &road), road)
    }

    fn hold() -> KineticsInput {
        KineticsInput {
            hold: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_hold_converges_to_road_speed() {
        let (mut p, road) = setup();
        let mut last = KineticsOutcome::default();
        for _ in 0..(5 * 60) {
            last = p.update(&hold(), ROAD_SPEED, &road, DT);
        }
        assert!((p.speed_multiplier() - 1.0).abs() < 1e-3);
        assert!(last.drift.abs() < 0.05);
        assert!(p.alive);
    }

    #[test]
    fn test_scenario_release_grace_then_decay() {
        let (mut p, road) = setup();
        for _ in 0..(5 * 60) {
            p.update(&hold(), ROAD_SPEED, &road, DT);
        }
        let held = p.speed_multiplier();

        // Inside the grace window nothing decays
        let grace = KineticsTuning::default().release_grace;
        let grace_frames = ((grace / DT) as usize).saturating_sub(1);
        for _ in 0..grace_frames {
            p.update(&KineticsInput::default(), ROAD_SPEED, &road, DT);
            assert!((p.speed_multiplier() - held).abs() < 1e-6);
        }

        // After it expires the multiplier decays toward zero, exponentially
        for _ in 0..3 {
            p.update(&KineticsInput::default(), ROAD_SPEED, &road, DT);
        }
        let a = p.speed_multiplier();
        assert!(a < held);
        p.update(&KineticsInput::default(), ROAD_SPEED, &road, DT);
        let b = p.speed_multiplier();
        let expected = a * (-KineticsTuning::default().stop_rate * DT).exp();
        assert!((b - expected).abs() < 1e-5);
    }

    #[test]
    fn test_taps_boost_above_hold() {
        let (mut p, road) = setup();
        for _ in 0..120 {
            p.update(&hold(), ROAD_SPEED, &road, DT);
        }
        for i in 0..60 {
            let input = KineticsInput {
                hold: true,
                tap: i % 4 == 0,
                ..Default::default()
            };
            p.update(&input, ROAD_SPEED, &road, DT);
        }
        assert!(p.speed_multiplier() > 1.05);
        assert!(p.tap_pressure() > 0.0);
    }

    #[test]
    fn test_acceleration_is_faster_than_stopping() {
        let (mut p, road) = setup();
        p.update(&hold(), ROAD_SPEED, &road, DT);
        let gained = p.speed_multiplier();

        let (mut q, _) = setup();
        q.speed_multiplier = 1.0;
        q.update(&KineticsInput::default(), ROAD_SPEED, &road, DT);
        let lost = 1.0 - q.speed_multiplier();
        assert!(gained > lost);
    }

    #[test]
    fn test_slow_zone_drags_target() {
        let (mut p, road) = setup();
        let input = KineticsInput {
            hold: true,
            in_slow: true,
            ..Default::default()
        };
        for _ in 0..600 {
            p.update(&input, ROAD_SPEED, &road, DT);
            if !p.alive {
                break;
            }
        }
        assert!(p.speed_multiplier() < 0.6);
    }

    #[test]
    fn test_left_boundary_kills_once() {
        let (mut p, road) = setup();
        // Stationary player drifts left at road speed
        let mut deaths = 0;
        for _ in 0..600 {
            if p.update(&KineticsInput::default(), ROAD_SPEED, &road, DT).boundary_death {
                deaths += 1;
            }
        }
        assert_eq!(deaths, 1);
        assert!(!p.alive);
        assert_eq!(p.pos.x, road.boundary_left);
    }

    #[test]
    fn test_invincible_clamps_without_death() {
        let (mut p, road) = setup();
        p.invincible = true;
        for _ in 0..600 {
            p.update(&KineticsInput::default(), ROAD_SPEED, &road, DT);
        }
        assert!(p.alive);
        assert_eq!(p.pos.x, road.boundary_left);
    }

    #[test]
    fn test_kill_only_once() {
        let (mut p, _) = setup();
        assert!(p.kill());
        assert!(!p.kill());
    }

    #[test]
    fn test_arrows_take_over_then_pointer_resumes() {
        let (mut p, road) = setup();
        let y0 = p.pos.y;
        let pointer = KineticsInput {
            hold: true,
            pointer_target: Some(road.lane_center(0)),
            ..Default::default()
        };
        p.update(&pointer, ROAD_SPEED, &road, DT);
        assert_eq!(p.lateral_source, LateralSource::Pointer);
        assert!(p.pos.y < y0);

        let arrow = KineticsInput {
            hold: true,
            arrow: 1,
            pointer_target: Some(road.lane_center(0)),
            ..Default::default()
        };
        let y1 = p.pos.y;
        p.update(&arrow, ROAD_SPEED, &road, DT);
        assert_eq!(p.lateral_source, LateralSource::Arrows);
        assert!(p.pos.y > y1);

        // Pointer sitting still does not steal control back
        let y2 = p.pos.y;
        p.update(&pointer, ROAD_SPEED, &road, DT);
        assert_eq!(p.lateral_source, LateralSource::Arrows);
        assert_eq!(p.pos.y, y2);

        // Moving it does
        let moved = KineticsInput {
            pointer_target: Some(road.lane_center(1)),
            ..pointer
        };
        p.update(&moved, ROAD_SPEED, &road, DT);
        assert_eq!(p.lateral_source, LateralSource::Pointer);
    }

    #[test]
    fn test_pointer_target_holds_after_pointer_goes_still() {
        let (mut p, road) = setup();
        let target = road.lane_center(0);
        let once = KineticsInput {
            hold: true,
            pointer_target: Some(target),
            ..Default::default()
        };
        p.update(&once, ROAD_SPEED, &road, DT);
        for _ in 0..120 {
            p.update(&hold(), ROAD_SPEED, &road, DT);
        }
        assert!((p.pos.y - target).abs() < 1.0, "stalled at y={}", p.pos.y);
    }

    #[test]
    fn test_injected_values_clamp_on_read() {
        let (mut p, road) = setup();
        p.speed_multiplier = 50.0;
        p.tap_pressure = -3.0;
        assert_eq!(p.speed_multiplier(), KineticsTuning::default().max_speed_multiplier);
        assert_eq!(p.tap_pressure(), 0.0);
        p.speed_multiplier = f32::NAN;
        assert_eq!(p.speed_multiplier(), 0.0);
        p.update(&hold(), ROAD_SPEED, &road, DT);
        assert!(p.speed_multiplier.is_finite());
    }

    #[test]
    fn test_speed_ratio_zero_road() {
        assert_eq!(speed_ratio(0.0, 0.0), 1.0);
        assert_eq!(speed_ratio(10.0, 0.0), 0.0);
        assert_eq!(speed_ratio(345.0, 690.0), 0.5);
    }

    proptest! {
        #[test]
        fn prop_kinetics_bounds(
            steps in proptest::collection::vec(
                (0.0f32..0.25, any::<bool>(), any::<bool>(), -1i8..=1, any::<bool>()),
                1..400,
            ),
            road_speed in 0.0f32..2000.0,
        ) {
            let (mut p, road) = setup();
            let max = KineticsTuning::default().max_speed_multiplier;
            for (dt, hold, tap, arrow, in_slow) in steps {
                let input = KineticsInput { hold, tap, arrow, pointer_target: None, in_slow };
                p.update(&input, road_speed, &road, dt);
                prop_assert!((0.0..=max).contains(&p.speed_multiplier));
                prop_assert!((0.0..=1.0).contains(&p.tap_pressure));
                let (top, bottom) = road.lateral_bounds();
                prop_assert!(p.pos.y >= top && p.pos.y <= bottom);
            }
        }
    }
}
