//! Data-driven game balance
//!
//! A `Tuning` is built once per run and handed to each component. Every
//! section defaults independently so a partial JSON file only overrides
//! what it names.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::LANE_COUNT;

/// Screen and road layout (pixels)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenTuning {
    pub width: f32,
    pub height: f32,
    /// Y of the top edge of lane 0
    pub road_top: f32,
    pub lane_height: f32,
    /// Player dies when its center reaches this x (unless invincible)
    pub boundary_left: f32,
    pub boundary_right: f32,
}

impl Default for ScreenTuning {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            road_top: 250.0,
            lane_height: 110.0,
            boundary_left: 40.0,
            boundary_right: 1240.0,
        }
    }
}

/// Player kinetics and lateral control
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticsTuning {
    /// Speed multiplier while holding with no tap pressure
    pub hold_multiplier: f32,
    /// Ceiling for the speed multiplier (full tap pressure)
    pub max_speed_multiplier: f32,
    /// Tap pressure added per tap event
    pub tap_increment: f32,
    /// Tap pressure lost per second
    pub tap_decay: f32,
    /// Seconds after release before deceleration starts
    pub release_grace: f32,
    /// Smoothing rate when speeding up (1/s)
    pub accel_rate: f32,
    /// Smoothing rate when coasting to a stop (1/s)
    pub stop_rate: f32,
    /// Smoothing rate when easing from a tap boost back to hold speed (1/s)
    pub ease_down_rate: f32,
    /// Target multiplier scale while inside a slow zone
    pub slow_drag: f32,
    pub player_radius: f32,
    pub start_x: f32,
    /// Lateral speed under arrow control (px/s)
    pub arrow_speed: f32,
    /// Lateral smoothing rate toward a pointer target (1/s)
    pub pointer_rate: f32,
}

impl Default for KineticsTuning {
    fn default() -> Self {
        Self {
            hold_multiplier: 1.0,
            max_speed_multiplier: 1.6,
            tap_increment: 0.25,
            tap_decay: 1.2,
            release_grace: 0.25,
            accel_rate: 6.0,
            stop_rate: 1.5,
            ease_down_rate: 3.0,
            slow_drag: 0.55,
            player_radius: 28.0,
            start_x: 360.0,
            arrow_speed: 540.0,
            pointer_rate: 12.0,
        }
    }
}

/// Wave spawning and hazard geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between waves at difficulty 0
    pub interval_max: f32,
    /// Seconds between waves at difficulty 1
    pub interval_min: f32,
    pub max_per_wave: usize,
    pub crash_chance_base: f32,
    pub crash_chance_max: f32,
    pub car_chance_base: f32,
    pub car_chance_max: f32,
    /// Fixed thresholds used while rage is active
    pub rage_crash_chance: f32,
    pub rage_car_chance: f32,
    /// Wave rate multiplier while rage is active
    pub rage_interval_multiplier: f32,
    /// Minimum off-screen distance for new hazards
    pub min_margin: f32,
    /// Warning lead time (s) the spawn margin must cover
    pub warning_lead: f32,
    /// Extra lead time given to cars
    pub car_extra_lead: f32,
    /// Car scroll speed as a fraction of road speed
    pub car_scroll_factor: f32,
    pub crash_size: Vec2,
    pub car_size: Vec2,
    /// Car hitbox ellipse as a fraction of the sprite size
    pub car_hitbox: Vec2,
    pub slow_height: f32,
    pub slow_min_length: f32,
    pub slow_max_length: f32,
    /// Seconds a destroyed car lingers before its slot is freed
    pub car_linger: f32,
    /// Chance a destroyed hazard drops a pickup
    pub pickup_chance: f32,
    /// Chance a destroyed hazard drops a shield (rolled when no pickup dropped)
    pub shield_chance: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval_max: 1.6,
            interval_min: 0.55,
            max_per_wave: 3,
            crash_chance_base: 0.6,
            crash_chance_max: 0.4,
            car_chance_base: 0.15,
            car_chance_max: 0.35,
            rage_crash_chance: 0.3,
            rage_car_chance: 0.6,
            rage_interval_multiplier: 1.8,
            min_margin: 120.0,
            warning_lead: 1.2,
            car_extra_lead: 0.6,
            car_scroll_factor: 0.55,
            crash_size: Vec2::new(70.0, 70.0),
            car_size: Vec2::new(160.0, 90.0),
            car_hitbox: Vec2::new(0.8, 0.55),
            slow_height: 80.0,
            slow_min_length: 180.0,
            slow_max_length: 420.0,
            car_linger: 0.6,
            pickup_chance: 0.25,
            shield_chance: 0.08,
        }
    }
}

/// Rage meter, shield and camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RageTuning {
    pub max_amount: f32,
    pub kill_gain: f32,
    pub pickup_gain: f32,
    /// Seconds rage stays active once triggered
    pub duration: f32,
    /// Seconds for the camera zoom to ramp in or out
    pub zoom_duration: f32,
    /// Camera scale at full zoom
    pub zoom_scale: f32,
    /// Invincibility after a shield absorbs a hit
    pub shield_recovery: f32,
}

impl Default for RageTuning {
    fn default() -> Self {
        Self {
            max_amount: 100.0,
            kill_gain: 10.0,
            pickup_gain: 25.0,
            duration: 6.0,
            zoom_duration: 0.5,
            zoom_scale: 1.15,
            shield_recovery: 1.0,
        }
    }
}

/// Melee and ranged attacks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    /// Melee box extends this far ahead of the player center
    pub melee_reach: f32,
    pub melee_height: f32,
    /// Seconds the melee hitbox is live after the swing starts
    pub melee_active: f32,
    /// Re-arm the swing after this long even if no animation signal arrives
    pub melee_fallback: f32,
    pub ranged_radius: f32,
    pub ranged_speed: f32,
    pub ranged_cooldown: f32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            melee_reach: 140.0,
            melee_height: 90.0,
            melee_active: 0.18,
            melee_fallback: 0.45,
            ranged_radius: 14.0,
            ranged_speed: 1400.0,
            ranged_cooldown: 0.6,
        }
    }
}

/// Phase timers (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Whether Title leads into the tutorial or straight to the countdown
    pub show_tutorial: bool,
    pub tutorial_panels: u8,
    pub tutorial_fade: f32,
    pub tutorial_blackout: f32,
    /// First countdown digit
    pub countdown_from: u8,
    pub countdown_animate: f32,
    pub countdown_delay: f32,
    /// Upper bound for the start cutscene when no completion signal arrives
    pub cutscene: f32,
    pub dying_ramp: f32,
    /// Exposure reached at the end of the ramp (near white)
    pub dying_peak: f32,
    pub dying_snap: f32,
    pub dying_hold: f32,
    pub dying_fade: f32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            show_tutorial: true,
            tutorial_panels: 3,
            tutorial_fade: 0.4,
            tutorial_blackout: 0.6,
            countdown_from: 3,
            countdown_animate: 0.6,
            countdown_delay: 0.25,
            cutscene: 1.2,
            dying_ramp: 1.0,
            dying_peak: 0.85,
            dying_snap: 0.08,
            dying_hold: 0.6,
            dying_fade: 0.8,
        }
    }
}

/// Difficulty ramp and road speed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Seconds of play to reach full difficulty
    pub ramp_seconds: f32,
    pub base_road_speed: f32,
    pub max_road_speed: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            ramp_seconds: 150.0,
            base_road_speed: 690.0,
            max_road_speed: 1150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Score per pixel of forward distance
    pub points_per_px: f32,
    pub crash_kill_bonus: u64,
    pub car_kill_bonus: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            points_per_px: 0.01,
            crash_kill_bonus: 100,
            car_kill_bonus: 250,
        }
    }
}

/// Complete per-run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub screen: ScreenTuning,
    pub kinetics: KineticsTuning,
    pub spawn: SpawnTuning,
    pub rage: RageTuning,
    pub attack: AttackTuning,
    pub timings: TimingTuning,
    pub difficulty: DifficultyTuning,
    pub scoring: ScoringTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning file and repair out-of-range values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        let spawn = &mut self.spawn;
        if spawn.max_per_wave == 0 || spawn.max_per_wave > LANE_COUNT {
            log::warn!(
                "max_per_wave {} out of range, clamping to 1..={}",
                spawn.max_per_wave,
                LANE_COUNT
            );
            spawn.max_per_wave = spawn.max_per_wave.clamp(1, LANE_COUNT);
        }
        if spawn.interval_min > spawn.interval_max {
            log::warn!("interval_min > interval_max, swapping");
            std::mem::swap(&mut spawn.interval_min, &mut spawn.interval_max);
        }
        spawn.interval_min = spawn.interval_min.max(0.05);
        for (name, crash, car) in [
            ("base", &mut spawn.crash_chance_base, &mut spawn.car_chance_base),
            ("max", &mut spawn.crash_chance_max, &mut spawn.car_chance_max),
            ("rage", &mut spawn.rage_crash_chance, &mut spawn.rage_car_chance),
        ] {
            *crash = crash.clamp(0.0, 1.0);
            *car = car.clamp(0.0, 1.0 - *crash);
            log::trace!("{} thresholds crash={} car={}", name, crash, car);
        }
        if spawn.slow_min_length > spawn.slow_max_length {
            log::warn!("slow_min_length > slow_max_length, swapping");
            std::mem::swap(&mut spawn.slow_min_length, &mut spawn.slow_max_length);
        }
        spawn.pickup_chance = spawn.pickup_chance.clamp(0.0, 1.0);
        spawn.shield_chance = spawn.shield_chance.clamp(0.0, 1.0);
        spawn.rage_interval_multiplier = spawn.rage_interval_multiplier.max(1.0);

        let kin = &mut self.kinetics;
        if kin.max_speed_multiplier < kin.hold_multiplier {
            log::warn!(
                "max_speed_multiplier {} below hold_multiplier {}, raising",
                kin.max_speed_multiplier,
                kin.hold_multiplier
            );
            kin.max_speed_multiplier = kin.hold_multiplier;
        }
        kin.hold_multiplier = kin.hold_multiplier.max(0.0);
        kin.tap_increment = kin.tap_increment.clamp(0.0, 1.0);
        kin.slow_drag = kin.slow_drag.clamp(0.0, 1.0);

        if self.timings.countdown_from < 2 {
            log::warn!("countdown_from must be at least 2, clamping");
            self.timings.countdown_from = 2;
        }
        self.timings.dying_peak = self.timings.dying_peak.clamp(0.0, 1.0);

        self.rage.max_amount = self.rage.max_amount.max(1.0);
        self
    }
}
