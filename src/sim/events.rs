//! Fire-and-forget notifications for audio, FX and pickup collaborators
//!
//! Called synchronously from inside `update`. Scores and hit lists are
//! returned as values instead and never go through here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::phase::PhaseKind;

/// Receiver for simulation events. All methods default to no-ops.
pub trait EventSink {
    /// A hazard was destroyed (car death, crash destroyed by an attack or rage)
    fn on_explosion(&mut self, _pos: Vec2) {}
    /// A pickup should appear behind a destroyed hazard
    fn on_pickup_spawn(&mut self, _pos: Vec2) {}
    /// A shield pickup should appear behind a destroyed hazard
    fn on_shield_spawn(&mut self, _pos: Vec2) {}
    /// The run moved to a new phase
    fn on_phase_change(&mut self, _from: PhaseKind, _to: PhaseKind) {}
}

/// Discards everything
impl EventSink for () {}

/// Recorded event, for replays and tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Explosion(Vec2),
    PickupSpawn(Vec2),
    ShieldSpawn(Vec2),
    PhaseChange { from: PhaseKind, to: PhaseKind },
}

impl EventSink for Vec<GameEvent> {
    fn on_explosion(&mut self, pos: Vec2) {
        self.push(GameEvent::Explosion(pos));
    }

    fn on_pickup_spawn(&mut self, pos: Vec2) {
        self.push(GameEvent::PickupSpawn(pos));
    }

    fn on_shield_spawn(&mut self, pos: Vec2) {
        self.push(GameEvent::ShieldSpawn(pos));
    }

    fn on_phase_change(&mut self, from: PhaseKind, to: PhaseKind) {
        self.push(GameEvent::PhaseChange { from, to });
    }
}
