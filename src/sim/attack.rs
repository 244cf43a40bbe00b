//! Melee swings and ranged shots
//!
//! Both only ever touch hazards in a single lane: the player's lane for a
//! swing, the firing lane for a shot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Probe};
use super::engine::{Hit, ObstacleEngine};
use super::events::EventSink;
use crate::tuning::AttackTuning;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MeleeState {
    #[default]
    Ready,
    Swinging {
        elapsed: f32,
    },
}

/// A ranged shot travelling right along its lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub lane: usize,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct Attacks {
    tuning: AttackTuning,
    pub melee: MeleeState,
    pub projectiles: Vec<Projectile>,
    ranged_cooldown: f32,
    /// Swing animation finished; consumed at the top of the next update
    melee_anim_done: bool,
}

impl Attacks {
    pub fn new(tuning: AttackTuning) -> Self {
        Self {
            tuning,
            melee: MeleeState::Ready,
            projectiles: Vec::new(),
            ranged_cooldown: 0.0,
            melee_anim_done: false,
        }
    }

    pub fn reset(&mut self) {
        self.melee = MeleeState::Ready;
        self.projectiles.clear();
        self.ranged_cooldown = 0.0;
        self.melee_anim_done = false;
    }

    /// Start a swing. Ignored while a swing is in progress.
    pub fn try_melee(&mut self) -> bool {
        if self.melee != MeleeState::Ready {
            return false;
        }
        self.melee = MeleeState::Swinging { elapsed: 0.0 };
        self.melee_anim_done = false;
        true
    }

    /// Fire a shot from `origin` along `lane`. Ignored during cooldown.
    pub fn try_ranged(&mut self, origin: Vec2, lane: usize) -> bool {
        if self.ranged_cooldown > 0.0 {
            return false;
        }
        self.projectiles.push(Projectile {
            pos: origin,
            lane,
            radius: self.tuning.ranged_radius,
        });
        self.ranged_cooldown = self.tuning.ranged_cooldown;
        true
    }

    /// The swing animation reported completion. Takes effect on the next
    /// update; extra signals for the same swing are dropped.
    pub fn signal_melee_finished(&mut self) {
        if matches!(self.melee, MeleeState::Swinging { .. }) {
            self.melee_anim_done = true;
        }
    }

    pub fn is_melee_ready(&self) -> bool {
        self.melee == MeleeState::Ready
    }

    /// Advance timers and move shots. Shots past `screen_width` are dropped.
    pub fn update(&mut self, dt: f32, screen_width: f32) {
        if std::mem::take(&mut self.melee_anim_done) {
            self.melee = MeleeState::Ready;
        }
        if let MeleeState::Swinging { elapsed } = &mut self.melee {
            *elapsed += dt;
            if *elapsed >= self.tuning.melee_fallback {
                self.melee = MeleeState::Ready;
            }
        }

        self.ranged_cooldown = (self.ranged_cooldown - dt).max(0.0);
        let speed = self.tuning.ranged_speed;
        for shot in &mut self.projectiles {
            shot.pos.x += speed * dt;
        }
        self.projectiles
            .retain(|shot| shot.pos.x - shot.radius <= screen_width);
    }

    /// Swing hitbox if the swing is within its live window
    pub fn melee_probe(&self, player_pos: Vec2) -> Option<Probe> {
        match self.melee {
            MeleeState::Swinging { elapsed } if elapsed <= self.tuning.melee_active => {
                let half_h = self.tuning.melee_height * 0.5;
                Some(Probe::Rect(Aabb {
                    min: Vec2::new(player_pos.x, player_pos.y - half_h),
                    max: Vec2::new(player_pos.x + self.tuning.melee_reach, player_pos.y + half_h),
                }))
            }
            _ => None,
        }
    }

    /// Run the swing and every shot against the hazards. A shot is spent on
    /// its first hit; a swing destroys everything it touches in the lane.
    pub fn resolve(
        &mut self,
        engine: &mut ObstacleEngine,
        player_pos: Vec2,
        player_lane: usize,
        events: &mut dyn EventSink,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        if let Some(probe) = self.melee_probe(player_pos) {
            hits.extend(engine.strike(&probe, Some(player_lane), usize::MAX, events));
        }

        self.projectiles.retain(|shot| {
            let probe = Probe::Circle {
                center: shot.pos,
                radius: shot.radius,
            };
            let shot_hits = engine.strike(&probe, Some(shot.lane), 1, events);
            let spent = !shot_hits.is_empty();
            hits.extend(shot_hits);
            !spent
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::road::Road;
    use crate::tuning::{ScreenTuning, SpawnTuning};

    fn engine() -> ObstacleEngine {
        ObstacleEngine::with_cosmetic(
            SpawnTuning::default(),
            Road::new(&ScreenTuning::default()),
            1,
            crate::sim::rng::CosmeticRng::with_seed(1),
        )
    }

    fn crash(engine: &ObstacleEngine, lane: usize, x: f32) -> Obstacle {
        Obstacle {
            kind: ObstacleKind::Crash,
            pos: Vec2::new(x, engine.road().lane_center(lane) - 35.0),
            size: Vec2::splat(70.0),
            lane,
            active: true,
        }
    }

    #[test]
    fn test_swing_rearms_once_on_signal() {
        let mut a = Attacks::new(AttackTuning::default());
        assert!(a.try_melee());
        assert!(!a.try_melee());
        a.signal_melee_finished();
        a.signal_melee_finished();
        // Not re-armed until the next update consumes the signal
        assert!(!a.is_melee_ready());
        a.update(0.01, 1280.0);
        assert!(a.is_melee_ready());
        // A late duplicate signal does nothing
        a.signal_melee_finished();
        assert!(a.try_melee());
        a.update(0.01, 1280.0);
        assert!(!a.is_melee_ready());
    }

    #[test]
    fn test_swing_fallback_rearm() {
        let mut a = Attacks::new(AttackTuning::default());
        a.try_melee();
        for _ in 0..60 {
            a.update(1.0 / 60.0, 1280.0);
        }
        assert!(a.is_melee_ready());
    }

    #[test]
    fn test_melee_window_closes() {
        let mut a = Attacks::new(AttackTuning::default());
        a.try_melee();
        assert!(a.melee_probe(Vec2::ZERO).is_some());
        a.update(0.3, 1280.0);
        assert!(a.melee_probe(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_melee_hits_only_player_lane() {
        let mut e = engine();
        let road = e.road().clone();
        e.insert(crash(&e, 1, 420.0));
        e.insert(crash(&e, 2, 420.0));
        let mut a = Attacks::new(AttackTuning::default());
        a.try_melee();
        let player = Vec2::new(360.0, road.lane_center(1) + 50.0);
        let hits = a.resolve(&mut e, player, 1, &mut ());
        assert_eq!(hits.len(), 1);
        assert!(e.obstacles()[1].active);
    }

    #[test]
    fn test_shot_spent_on_first_hit() {
        let mut e = engine();
        let road = e.road().clone();
        e.insert(crash(&e, 0, 600.0));
        e.insert(crash(&e, 0, 610.0));
        let mut a = Attacks::new(AttackTuning::default());
        assert!(a.try_ranged(Vec2::new(620.0, road.lane_center(0)), 0));
        assert!(!a.try_ranged(Vec2::new(620.0, road.lane_center(0)), 0));
        let hits = a.resolve(&mut e, Vec2::ZERO, 3, &mut ());
        assert_eq!(hits.len(), 1);
        assert!(a.projectiles.is_empty());
    }

    #[test]
    fn test_shots_leave_screen() {
        let mut a = Attacks::new(AttackTuning::default());
        a.try_ranged(Vec2::new(1200.0, 300.0), 0);
        a.update(0.5, 1280.0);
        assert!(a.projectiles.is_empty());
    }
}
