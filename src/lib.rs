//! Lane Rush - lane-based endless runner simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (hazard waves, kinetics, run sequencing)
//! - `tuning`: Data-driven game balance, fixed for the duration of a run
//! - `leaderboard`: In-memory score table used to gate name entry

pub mod leaderboard;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use leaderboard::{HighScores, Leaderboard};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the sim will accept in one update
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Number of lanes on the road
    pub const LANE_COUNT: usize = 4;
    /// Number of cosmetic car skins
    pub const CAR_SKIN_COUNT: u8 = 6;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out on [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Cubic ease-in on [0, 1]
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Quadratic ease-in on [0, 1]
#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `rate` is in 1/seconds: after `1/rate` seconds roughly 63% of the gap is closed.
#[inline]
pub fn approach_exp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 || dt <= 0.0 {
        return current;
    }
    target + (current - target) * (-rate * dt).exp()
}

/// Progress of `elapsed` through `duration`, clamped to [0, 1].
///
/// A zero-length duration counts as already complete.
#[inline]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_cubic(1.0), 1.0);
        assert_eq!(ease_in_quad(0.5), 0.25);
        // Out-of-range inputs clamp
        assert_eq!(ease_in_cubic(2.0), 1.0);
    }

    #[test]
    fn test_approach_exp_converges() {
        let mut v = 0.0;
        for _ in 0..600 {
            v = approach_exp(v, 1.0, 5.0, 1.0 / 60.0);
        }
        assert!((v - 1.0).abs() < 1e-4);
        // Never overshoots
        assert!(v <= 1.0);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert_eq!(progress(0.0, 0.0), 1.0);
        assert_eq!(progress(0.5, 1.0), 0.5);
        assert_eq!(progress(3.0, 1.0), 1.0);
    }
}
