//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta, clamped
//! - Seeded RNG for anything that affects play; cosmetic draws use their own stream
//! - Stable iteration order (pool slot order)
//! - No rendering or platform dependencies

pub mod attack;
pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod engine;
pub mod events;
pub mod input;
pub mod obstacle;
pub mod phase;
pub mod player;
pub mod rage;
pub mod rng;
pub mod road;
pub mod run;

pub use attack::{Attacks, MeleeState, Projectile};
pub use clock::FrameClock;
pub use collision::{Aabb, Ellipse, Probe};
pub use difficulty::DifficultyRamp;
pub use engine::{
    ContactMode, FrameContext, Hit, LaneWarning, ObstacleEngine, PlayerContact, SpawnRecord,
    WaveParams,
};
pub use events::{EventSink, GameEvent};
pub use input::{FrameInput, InputSource};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleType};
pub use phase::{
    Countdown, CountdownStep, DeathSequence, DeathStep, PhaseKind, PhaseView, Reveal, RunPhase, Tutorial,
    TutorialStep,
};
pub use player::{KineticsInput, KineticsOutcome, LateralSource, Player, speed_ratio};
pub use rage::{RageState, ShieldState};
pub use rng::{CosmeticRng, RngCursor, SeededRng};
pub use road::Road;
pub use run::{DeathCause, Pickup, RunStateMachine};
