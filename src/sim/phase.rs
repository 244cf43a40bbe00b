//! Run phases and their sub-machines
//!
//! Each phase owns its timers. Entering a phase builds a fresh payload, so
//! nothing carries over from a previous visit.

use serde::{Deserialize, Serialize};

use crate::tuning::TimingTuning;
use crate::{ease_in_cubic, ease_in_quad, ease_out_cubic, lerp, progress};

/// Phase tag without payload, for transitions and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Title,
    Tutorial,
    Starting,
    Playing,
    Dying,
    NameEntry,
    Dead,
}

impl PhaseKind {
    /// Whether `self -> to` is a legal edge
    pub fn can_enter(self, to: PhaseKind) -> bool {
        use PhaseKind as P;
        match (self, to) {
            // Return to title from anywhere but Title
            (from, P::Title) => from != P::Title,
            (P::Title, P::Tutorial) | (P::Title, P::Starting) => true,
            (P::Tutorial, P::Starting) => true,
            (P::Starting, P::Playing) => true,
            (P::Playing, P::Dying) => true,
            (P::Dying, P::NameEntry) | (P::Dying, P::Dead) => true,
            (P::NameEntry, P::Dead) => true,
            (P::Dead, P::Playing) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TutorialStep {
    FadeIn { panel: u8 },
    /// Waiting for an advance input
    Wait { panel: u8 },
    FadeOut { panel: u8 },
    /// Fade to black; shared ending for completed and skipped walkthroughs
    Blackout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutorial {
    pub step: TutorialStep,
    timer: f32,
    panels: u8,
    fade: f32,
    blackout: f32,
}

impl Tutorial {
    pub fn new(timings: &TimingTuning) -> Self {
        let step = if timings.tutorial_panels == 0 {
            TutorialStep::Blackout
        } else {
            TutorialStep::FadeIn { panel: 0 }
        };
        Self {
            step,
            timer: 0.0,
            panels: timings.tutorial_panels,
            fade: timings.tutorial_fade,
            blackout: timings.tutorial_blackout,
        }
    }

    fn go(&mut self, step: TutorialStep) {
        self.step = step;
        self.timer = 0.0;
    }

    /// Jump to the blackout ending
    pub fn skip(&mut self) {
        if self.step != TutorialStep::Blackout {
            self.go(TutorialStep::Blackout);
        }
    }

    /// Returns true once the blackout has finished
    pub fn update(&mut self, dt: f32, advance: bool) -> bool {
        self.timer += dt;
        match self.step {
            TutorialStep::FadeIn { panel } => {
                if self.timer >= self.fade {
                    self.go(TutorialStep::Wait { panel });
                }
            }
            TutorialStep::Wait { panel } => {
                if advance {
                    self.go(TutorialStep::FadeOut { panel });
                }
            }
            TutorialStep::FadeOut { panel } => {
                if self.timer >= self.fade {
                    if panel + 1 < self.panels {
                        self.go(TutorialStep::FadeIn { panel: panel + 1 });
                    } else {
                        self.go(TutorialStep::Blackout);
                    }
                }
            }
            TutorialStep::Blackout => return self.timer >= self.blackout,
        }
        false
    }

    /// Current panel opacity
    pub fn panel_alpha(&self) -> f32 {
        match self.step {
            TutorialStep::FadeIn { .. } => progress(self.timer, self.fade),
            TutorialStep::Wait { .. } => 1.0,
            TutorialStep::FadeOut { .. } => 1.0 - progress(self.timer, self.fade),
            TutorialStep::Blackout => 0.0,
        }
    }

    /// Black overlay opacity
    pub fn blackout_alpha(&self) -> f32 {
        match self.step {
            TutorialStep::Blackout => progress(self.timer, self.blackout),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownStep {
    /// Digit scales up and fades out
    Animate,
    /// Gap before the next digit
    Delay,
    /// Start cutscene; the last digit is never shown
    Cutscene,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    pub step: CountdownStep,
    pub digit: u8,
    timer: f32,
    animate: f32,
    delay: f32,
    cutscene: f32,
}

impl Countdown {
    pub fn new(timings: &TimingTuning) -> Self {
        Self {
            step: CountdownStep::Animate,
            digit: timings.countdown_from.max(2),
            timer: 0.0,
            animate: timings.countdown_animate,
            delay: timings.countdown_delay,
            cutscene: timings.cutscene,
        }
    }

    fn go(&mut self, step: CountdownStep) {
        self.step = step;
        self.timer = 0.0;
    }

    /// Returns true when play should begin. `cutscene_done` ends the
    /// cutscene early; otherwise it times out.
    pub fn update(&mut self, dt: f32, cutscene_done: bool) -> bool {
        self.timer += dt;
        match self.step {
            CountdownStep::Animate => {
                if self.timer >= self.animate {
                    self.go(CountdownStep::Delay);
                }
            }
            CountdownStep::Delay => {
                if self.timer >= self.delay {
                    if self.digit > 2 {
                        self.digit -= 1;
                        self.go(CountdownStep::Animate);
                    } else {
                        log::debug!("countdown reached {}, starting cutscene", self.digit);
                        self.go(CountdownStep::Cutscene);
                    }
                }
            }
            CountdownStep::Cutscene => {
                return cutscene_done || self.timer >= self.cutscene;
            }
        }
        false
    }

    /// Digit to draw, if any
    pub fn visible_digit(&self) -> Option<u8> {
        match self.step {
            CountdownStep::Animate => Some(self.digit),
            _ => None,
        }
    }

    pub fn digit_scale(&self) -> f32 {
        match self.step {
            CountdownStep::Animate => lerp(0.5, 1.5, ease_out_cubic(progress(self.timer, self.animate))),
            _ => 0.0,
        }
    }

    pub fn digit_alpha(&self) -> f32 {
        match self.step {
            CountdownStep::Animate => 1.0 - ease_in_cubic(progress(self.timer, self.animate)),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathStep {
    /// Exposure eases up to the near-white peak
    Ramp,
    /// Quick snap to full white
    Snap,
    Hold,
    /// Fade out, revealing the next screen
    Fade,
}

/// Screen revealed after the death sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reveal {
    NameEntry,
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathSequence {
    pub step: DeathStep,
    timer: f32,
    /// Decided once at the end of the hold
    pub reveal: Option<Reveal>,
    timings: TimingTuning,
}

impl DeathSequence {
    pub fn new(timings: &TimingTuning) -> Self {
        Self {
            step: DeathStep::Ramp,
            timer: 0.0,
            reveal: None,
            timings: timings.clone(),
        }
    }

    fn go(&mut self, step: DeathStep) {
        self.step = step;
        self.timer = 0.0;
    }

    /// Advance the sequence. `decide` is called exactly once, when the hold
    /// ends. Returns the reveal when the fade completes.
    pub fn update(&mut self, dt: f32, decide: impl FnOnce() -> Reveal) -> Option<Reveal> {
        self.timer += dt;
        let t = &self.timings;
        match self.step {
            DeathStep::Ramp => {
                if self.timer >= t.dying_ramp {
                    self.go(DeathStep::Snap);
                }
            }
            DeathStep::Snap => {
                if self.timer >= t.dying_snap {
                    self.go(DeathStep::Hold);
                }
            }
            DeathStep::Hold => {
                if self.timer >= t.dying_hold {
                    if self.reveal.is_none() {
                        self.reveal = Some(decide());
                    }
                    self.go(DeathStep::Fade);
                }
            }
            DeathStep::Fade => {
                if self.timer >= t.dying_fade {
                    return self.reveal;
                }
            }
        }
        None
    }

    /// White overlay strength in [0, 1]
    pub fn exposure(&self) -> f32 {
        let t = &self.timings;
        match self.step {
            DeathStep::Ramp => t.dying_peak * ease_in_quad(progress(self.timer, t.dying_ramp)),
            DeathStep::Snap => lerp(t.dying_peak, 1.0, progress(self.timer, t.dying_snap)),
            DeathStep::Hold => 1.0,
            DeathStep::Fade => 1.0 - progress(self.timer, t.dying_fade),
        }
    }
}

/// What a renderer needs to draw the current phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum PhaseView {
    Title,
    Tutorial {
        step: TutorialStep,
        panel_alpha: f32,
        blackout_alpha: f32,
    },
    Starting {
        step: CountdownStep,
        digit: Option<u8>,
        digit_scale: f32,
        digit_alpha: f32,
    },
    Playing,
    Dying {
        step: DeathStep,
        exposure: f32,
    },
    NameEntry,
    Dead,
}

/// Top-level run phase with its private state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunPhase {
    Title,
    Tutorial(Tutorial),
    Starting(Countdown),
    Playing,
    Dying(DeathSequence),
    NameEntry,
    Dead,
}

impl RunPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            RunPhase::Title => PhaseKind::Title,
            RunPhase::Tutorial(_) => PhaseKind::Tutorial,
            RunPhase::Starting(_) => PhaseKind::Starting,
            RunPhase::Playing => PhaseKind::Playing,
            RunPhase::Dying(_) => PhaseKind::Dying,
            RunPhase::NameEntry => PhaseKind::NameEntry,
            RunPhase::Dead => PhaseKind::Dead,
        }
    }

    pub fn view(&self) -> PhaseView {
        match self {
            RunPhase::Title => PhaseView::Title,
            RunPhase::Tutorial(t) => PhaseView::Tutorial {
                step: t.step,
                panel_alpha: t.panel_alpha(),
                blackout_alpha: t.blackout_alpha(),
            },
            RunPhase::Starting(c) => PhaseView::Starting {
                step: c.step,
                digit: c.visible_digit(),
                digit_scale: c.digit_scale(),
                digit_alpha: c.digit_alpha(),
            },
            RunPhase::Playing => PhaseView::Playing,
            RunPhase::Dying(d) => PhaseView::Dying {
                step: d.step,
                exposure: d.exposure(),
            },
            RunPhase::NameEntry => PhaseView::NameEntry,
            RunPhase::Dead => PhaseView::Dead,
        }
    }

    /// Fresh phase state for `kind`
    pub fn enter(kind: PhaseKind, timings: &TimingTuning) -> Self {
        match kind {
            PhaseKind::Title => RunPhase::Title,
            PhaseKind::Tutorial => RunPhase::Tutorial(Tutorial::new(timings)),
            PhaseKind::Starting => RunPhase::Starting(Countdown::new(timings)),
            PhaseKind::Playing => RunPhase::Playing,
            PhaseKind::Dying => RunPhase::Dying(DeathSequence::new(timings)),
            PhaseKind::NameEntry => RunPhase::NameEntry,
            PhaseKind::Dead => RunPhase::Dead,
        }
    }
}
