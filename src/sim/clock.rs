//! Fixed-step driver for hosts with variable frame rates

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::leaderboard::Leaderboard;

use super::events::EventSink;
use super::input::FrameInput;
use super::run::RunStateMachine;

/// Accumulates host frame time and runs the machine in `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unspent time carried into the next frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Feed one host frame. Returns the number of sim steps taken.
    ///
    /// Edges latched on `input` are cleared only once a step has seen them,
    /// so presses on frames shorter than `SIM_DT` carry over.
    pub fn advance(
        &mut self,
        frame_dt: f32,
        sm: &mut RunStateMachine,
        input: &mut FrameInput,
        sink: &mut dyn EventSink,
        board: &dyn Leaderboard,
    ) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            sm.update(SIM_DT, input, sink, board);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.clear_edges();
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::trace!("dropping {:.3}s of sim backlog", self.accumulator);
            self.accumulator %= SIM_DT;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CosmeticRng, PhaseKind};
    use crate::tuning::Tuning;

    struct NoScores;

    impl Leaderboard for NoScores {
        fn qualifies(&self, _score: u64) -> bool {
            false
        }

        fn has_identity(&self) -> bool {
            false
        }
    }

    fn title() -> RunStateMachine {
        let mut tuning = Tuning::default();
        tuning.timings.show_tutorial = false;
        RunStateMachine::with_cosmetic(tuning, 12345, CosmeticRng::with_seed(7))
    }

    #[test]
    fn test_short_frame_keeps_pending_press() {
        let mut sm = title();
        let mut clock = FrameClock::new();
        let mut input = FrameInput {
            confirm: true,
            ..Default::default()
        };

        // 120 Hz: the first frame is too short for a step
        assert_eq!(clock.advance(1.0 / 120.0, &mut sm, &mut input, &mut (), &NoScores), 0);
        assert!(input.confirm);
        assert_eq!(sm.phase_kind(), PhaseKind::Title);

        assert_eq!(clock.advance(1.0 / 120.0, &mut sm, &mut input, &mut (), &NoScores), 1);
        assert!(!input.confirm);
        assert_eq!(sm.phase_kind(), PhaseKind::Starting);
    }

    #[test]
    fn test_edges_cleared_after_step_hold_kept() {
        let mut sm = title();
        let mut clock = FrameClock::new();
        let mut input = FrameInput {
            hold: true,
            tap: true,
            pointer_target: Some(300.0),
            ..Default::default()
        };
        assert_eq!(clock.advance(SIM_DT, &mut sm, &mut input, &mut (), &NoScores), 1);
        assert!(input.hold);
        assert!(!input.tap);
        assert_eq!(input.pointer_target, None);
    }

    #[test]
    fn test_substeps_capped_and_backlog_dropped() {
        let mut sm = title();
        let mut clock = FrameClock::new();
        let mut input = FrameInput::default();
        let steps = clock.advance(1.0, &mut sm, &mut input, &mut (), &NoScores);
        assert!(steps <= MAX_SUBSTEPS);
        assert!(clock.accumulator() < SIM_DT);

        assert_eq!(clock.advance(f32::NAN, &mut sm, &mut input, &mut (), &NoScores), 0);
        assert!(clock.accumulator().is_finite());
    }
}
