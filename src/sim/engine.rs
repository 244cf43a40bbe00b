//! Obstacle engine: pooled hazards, wave spawning, scrolling and collisions
//!
//! Per-frame order, driven by the run state machine:
//! 1. `update`: wave timer + spawn, scroll, linger countdown, car-vs-crash
//! 2. `strike` for melee/ranged attacks
//! 3. `check_player`
//!
//! All scans walk the pool in slot order. Slots are never removed during a
//! run, so indices held by renderers stay valid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Probe;
use super::events::EventSink;
use super::obstacle::{Obstacle, ObstacleKind, ObstacleType, car_hits_crash, scroll_speed_for};
use super::rng::{CosmeticRng, SeededRng};
use super::road::Road;
use crate::consts::{CAR_SKIN_COUNT, LANE_COUNT};
use crate::lerp;
use crate::tuning::SpawnTuning;

/// Inputs the engine needs from the rest of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Difficulty factor in [0, 1]
    pub difficulty: f32,
    /// Road scroll speed (px/s)
    pub road_speed: f32,
    /// Rage was active at the start of this frame
    pub rage_active: bool,
}

/// Derived parameters for one wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    /// Number of lanes that receive a hazard
    pub count: usize,
    /// Rolls below this are crash hazards
    pub crash_threshold: f32,
    /// Rolls below this (and above `crash_threshold`) are cars; the rest are slow zones
    pub car_threshold: f32,
    /// Seconds until the next wave
    pub interval: f32,
}

/// One spawned hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub slot: usize,
    pub lane: usize,
    pub ty: ObstacleType,
}

/// A hazard destroyed by an attack or by rage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub slot: usize,
    pub ty: ObstacleType,
    /// Contact point
    pub pos: Vec2,
}

/// How player contact with lethal hazards resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMode {
    /// Normal play. A shield, if held, absorbs the first lethal contact.
    Lethal { shielded: bool },
    /// Rage: every lethal hazard touched is destroyed instead
    Destructive,
    /// Post-shield recovery: lethal hazards pass through untouched
    Ghost,
}

/// Result of a player collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerContact {
    /// Player hit a lethal hazard
    pub crashed: Option<Hit>,
    /// The shield took a lethal hit; contact point
    pub shield_absorbed: Option<Vec2>,
    /// Player overlaps at least one slow zone this frame
    pub in_slow: bool,
    /// Hazards destroyed in destructive mode, in pool order
    pub hits: Vec<Hit>,
}

/// Nearest incoming off-screen hazard in a lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneWarning {
    pub lane: usize,
    pub ty: ObstacleType,
    /// Seconds until the hazard's leading edge crosses the right screen edge
    pub time_to_arrival: f32,
}

pub struct ObstacleEngine {
    tuning: SpawnTuning,
    road: Road,
    pool: Vec<Obstacle>,
    rng: SeededRng,
    cosmetic: CosmeticRng,
    wave_timer: f32,
    waves_spawned: u32,
    explosion_requests: Vec<Vec2>,
}

impl ObstacleEngine {
    pub fn new(tuning: SpawnTuning, road: Road, seed: u64) -> Self {
        Self::with_cosmetic(tuning, road, seed, CosmeticRng::new())
    }

    /// Engine with an explicit cosmetic stream (stable visuals in tests/replays)
    pub fn with_cosmetic(tuning: SpawnTuning, road: Road, seed: u64, cosmetic: CosmeticRng) -> Self {
        Self {
            tuning,
            road,
            pool: Vec::new(),
            rng: SeededRng::new(seed),
            cosmetic,
            wave_timer: 0.0,
            waves_spawned: 0,
            explosion_requests: Vec::new(),
        }
    }

    /// Deactivate every slot and restart the seeded stream. The pool keeps its size.
    pub fn reset(&mut self, seed: u64) {
        for obstacle in &mut self.pool {
            obstacle.active = false;
        }
        self.rng.reset(seed);
        self.wave_timer = 0.0;
        self.waves_spawned = 0;
        self.explosion_requests.clear();
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.pool
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|o| o.active).count()
    }

    pub fn waves_spawned(&self) -> u32 {
        self.waves_spawned
    }

    pub fn rng(&self) -> &SeededRng {
        &self.rng
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    /// Explosion effects queued since the last call, for the renderer
    pub fn take_explosion_requests(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.explosion_requests)
    }

    /// Wave parameters for the given difficulty
    pub fn wave_params(&self, difficulty: f32, rage_active: bool) -> WaveParams {
        let t = &self.tuning;
        let d = difficulty.clamp(0.0, 1.0);
        let max_per_wave = t.max_per_wave.clamp(1, LANE_COUNT);
        let count = (1 + (d * (max_per_wave - 1) as f32).floor() as usize).min(max_per_wave);

        let (crash, car) = if rage_active {
            (t.rage_crash_chance, t.rage_car_chance)
        } else {
            (
                lerp(t.crash_chance_base, t.crash_chance_max, d),
                lerp(t.car_chance_base, t.car_chance_max, d),
            )
        };

        let mut interval = lerp(t.interval_max, t.interval_min, d);
        if rage_active && t.rage_interval_multiplier > 0.0 {
            interval /= t.rage_interval_multiplier;
        }

        WaveParams {
            count,
            crash_threshold: crash,
            car_threshold: crash + car,
            interval,
        }
    }

    /// Off-screen distance for a new hazard: enough to give the warning
    /// system its full lead time at this hazard's scroll speed.
    pub fn spawn_margin(&self, ty: ObstacleType, road_speed: f32) -> f32 {
        let speed = scroll_speed_for(ty, road_speed, self.tuning.car_scroll_factor);
        let lead = self.warning_lead(ty);
        (speed * lead).max(self.tuning.min_margin)
    }

    fn warning_lead(&self, ty: ObstacleType) -> f32 {
        match ty {
            ObstacleType::Car => self.tuning.warning_lead + self.tuning.car_extra_lead,
            _ => self.tuning.warning_lead,
        }
    }

    /// Advance one frame: spawn, scroll, linger, car-vs-crash.
    /// Returns the hazards spawned this frame.
    pub fn update(
        &mut self,
        dt: f32,
        ctx: &FrameContext,
        events: &mut dyn EventSink,
    ) -> Vec<SpawnRecord> {
        let params = self.wave_params(ctx.difficulty, ctx.rage_active);
        self.wave_timer += dt;
        let spawned = if self.wave_timer >= params.interval {
            self.wave_timer = 0.0;
            self.spawn_wave(ctx.difficulty, ctx.rage_active, ctx.road_speed)
        } else {
            Vec::new()
        };

        self.scroll(dt, ctx.road_speed);
        self.resolve_car_crash(events);
        spawned
    }

    /// Spawn one wave immediately.
    ///
    /// Draw order on the seeded stream: lane shuffle, then per lane one type
    /// roll followed by a length roll for slow zones.
    pub fn spawn_wave(
        &mut self,
        difficulty: f32,
        rage_active: bool,
        road_speed: f32,
    ) -> Vec<SpawnRecord> {
        let params = self.wave_params(difficulty, rage_active);
        let mut lanes: [usize; LANE_COUNT] = std::array::from_fn(|i| i);
        self.rng.shuffle(&mut lanes);

        let mut records = Vec::with_capacity(params.count);
        for &lane in &lanes[..params.count] {
            let roll = self.rng.next();
            let ty = if roll < params.crash_threshold {
                ObstacleType::Crash
            } else if roll < params.car_threshold {
                ObstacleType::Car
            } else {
                ObstacleType::Slow
            };
            let slot = self.spawn_one(lane, ty, road_speed);
            records.push(SpawnRecord { slot, lane, ty });
        }

        self.waves_spawned += 1;
        log::debug!(
            "wave {}: difficulty={:.2} rage={} spawned {:?}",
            self.waves_spawned,
            difficulty,
            rage_active,
            records.iter().map(|r| (r.lane, r.ty)).collect::<Vec<_>>()
        );
        records
    }

    fn spawn_one(&mut self, lane: usize, ty: ObstacleType, road_speed: f32) -> usize {
        let (kind, size) = match ty {
            ObstacleType::Crash => (ObstacleKind::Crash, self.tuning.crash_size),
            ObstacleType::Slow => {
                let length = self
                    .rng
                    .range(self.tuning.slow_min_length, self.tuning.slow_max_length);
                (ObstacleKind::Slow, Vec2::new(length, self.tuning.slow_height))
            }
            ObstacleType::Car => {
                // Cosmetic only: must not advance the seeded stream
                let skin = self.cosmetic.skin(CAR_SKIN_COUNT);
                (ObstacleKind::Car { skin, linger: None }, self.tuning.car_size)
            }
        };
        let x = self.road.width + self.spawn_margin(ty, road_speed);
        let y = self.road.lane_center(lane) - size.y * 0.5;
        self.insert(Obstacle {
            kind,
            pos: Vec2::new(x, y),
            size,
            lane,
            active: true,
        })
    }

    /// Place an obstacle into the first free slot, growing the pool by one if full
    pub fn insert(&mut self, obstacle: Obstacle) -> usize {
        let slot = match self.pool.iter().position(|o| !o.active) {
            Some(i) => i,
            None => {
                self.pool.push(Obstacle::inactive());
                self.pool.len() - 1
            }
        };
        self.pool[slot] = obstacle;
        slot
    }

    fn scroll(&mut self, dt: f32, road_speed: f32) {
        let factor = self.tuning.car_scroll_factor;
        for obstacle in self.pool.iter_mut().filter(|o| o.active) {
            obstacle.pos.x -= obstacle.scroll_speed(road_speed, factor) * dt;
            obstacle.tick_linger(dt);
            if obstacle.is_off_screen_left() {
                obstacle.active = false;
            }
        }
    }

    /// Cars that touch crash hazards destroy both. Overlaps are collected
    /// before anything is destroyed so the outcome does not depend on the
    /// order in which pairs are visited.
    fn resolve_car_crash(&mut self, events: &mut dyn EventSink) {
        let hitbox = self.tuning.car_hitbox;
        let mut pairs = Vec::new();
        for (ci, car) in self.pool.iter().enumerate() {
            if !car.can_collide() || car.ty() != ObstacleType::Car {
                continue;
            }
            for (xi, crash) in self.pool.iter().enumerate() {
                if !crash.can_collide() || crash.ty() != ObstacleType::Crash {
                    continue;
                }
                if let Some(point) = car_hits_crash(car, crash, hitbox) {
                    pairs.push((ci, xi, point));
                }
            }
        }

        for (ci, xi, point) in pairs {
            self.pool[ci].start_linger(self.tuning.car_linger);
            self.pool[xi].active = false;
            self.explode(point, events);
        }
    }

    fn explode(&mut self, pos: Vec2, events: &mut dyn EventSink) {
        self.explosion_requests.push(pos);
        events.on_explosion(pos);
    }

    /// Destroy a lethal hazard in `slot`: crashes despawn, cars start lingering.
    fn destroy(&mut self, slot: usize, point: Vec2, events: &mut dyn EventSink) {
        let obstacle = &mut self.pool[slot];
        match obstacle.kind {
            ObstacleKind::Car { .. } => {
                obstacle.start_linger(self.tuning.car_linger);
            }
            _ => obstacle.active = false,
        }
        self.explode(point, events);
    }

    /// Seeded drop roll behind a hazard destroyed by the player
    fn roll_drop(&mut self, pos: Vec2, events: &mut dyn EventSink) {
        if self.rng.next() < self.tuning.pickup_chance {
            events.on_pickup_spawn(pos);
        } else if self.rng.next() < self.tuning.shield_chance {
            events.on_shield_spawn(pos);
        }
    }

    /// Attack hit test. Only hazards in `lane` (when given) are considered so
    /// a swing or shot never reaches into another lane. Slow zones cannot be
    /// destroyed. Every hazard hit is destroyed and reported, up to `limit`.
    pub fn strike(
        &mut self,
        probe: &Probe,
        lane: Option<usize>,
        limit: usize,
        events: &mut dyn EventSink,
    ) -> Vec<Hit> {
        let hitbox = self.tuning.car_hitbox;
        let mut hits = Vec::new();
        for slot in 0..self.pool.len() {
            if hits.len() >= limit {
                break;
            }
            let obstacle = &self.pool[slot];
            if !obstacle.can_collide() || obstacle.ty() == ObstacleType::Slow {
                continue;
            }
            if lane.is_some_and(|l| l != obstacle.lane) {
                continue;
            }
            if let Some(point) = obstacle.hitbox(hitbox).hit_by(probe) {
                let ty = obstacle.ty();
                let center = obstacle.center();
                self.destroy(slot, point, events);
                self.roll_drop(center, events);
                hits.push(Hit { slot, ty, pos: point });
            }
        }
        hits
    }

    /// Player body vs every hazard, in pool order.
    ///
    /// Lethal mode: the first lethal contact either crashes the player or is
    /// absorbed by the shield; later lethal contacts this frame are ignored.
    /// Destructive mode: every lethal hazard touched is destroyed and listed.
    /// Slow zones only ever report overlap.
    pub fn check_player(
        &mut self,
        center: Vec2,
        radius: f32,
        mode: ContactMode,
        events: &mut dyn EventSink,
    ) -> PlayerContact {
        let hitbox = self.tuning.car_hitbox;
        let mut contact = PlayerContact::default();
        let mut lethal_resolved = false;

        for slot in 0..self.pool.len() {
            let obstacle = &self.pool[slot];
            if !obstacle.can_collide() {
                continue;
            }
            let Some(point) = obstacle.hitbox(hitbox).hit_by_circle(center, radius) else {
                continue;
            };
            let ty = obstacle.ty();
            let drop_at = obstacle.center();

            match (ty, mode) {
                (ObstacleType::Slow, _) => contact.in_slow = true,
                (_, ContactMode::Destructive) => {
                    self.destroy(slot, point, events);
                    self.roll_drop(drop_at, events);
                    contact.hits.push(Hit { slot, ty, pos: point });
                }
                (_, ContactMode::Ghost) => {}
                (_, ContactMode::Lethal { .. }) if lethal_resolved => {}
                (_, ContactMode::Lethal { shielded: true }) => {
                    self.destroy(slot, point, events);
                    contact.shield_absorbed = Some(point);
                    lethal_resolved = true;
                }
                (ObstacleType::Crash, ContactMode::Lethal { shielded: false }) => {
                    self.pool[slot].active = false;
                    contact.crashed = Some(Hit { slot, ty, pos: point });
                    lethal_resolved = true;
                }
                (ObstacleType::Car, ContactMode::Lethal { shielded: false }) => {
                    self.destroy(slot, point, events);
                    contact.crashed = Some(Hit { slot, ty, pos: point });
                    lethal_resolved = true;
                }
            }
        }
        contact
    }

    /// Nearest incoming off-screen hazard per lane whose arrival is within
    /// its warning lead time.
    pub fn upcoming_per_lane(&self, road_speed: f32) -> [Option<LaneWarning>; LANE_COUNT] {
        let mut warnings: [Option<LaneWarning>; LANE_COUNT] = [None; LANE_COUNT];
        for obstacle in &self.pool {
            if !obstacle.can_collide() || obstacle.pos.x <= self.road.width {
                continue;
            }
            let speed = obstacle.scroll_speed(road_speed, self.tuning.car_scroll_factor);
            if speed <= 0.0 {
                continue;
            }
            let ty = obstacle.ty();
            let time_to_arrival = (obstacle.pos.x - self.road.width) / speed;
            if time_to_arrival > self.warning_lead(ty) {
                continue;
            }
            let Some(entry) = warnings.get_mut(obstacle.lane) else {
                continue;
            };
            if entry.is_none_or(|w| time_to_arrival < w.time_to_arrival) {
                *entry = Some(LaneWarning {
                    lane: obstacle.lane,
                    ty,
                    time_to_arrival,
                });
            }
        }
        warnings
    }
}
