//! Run state machine: top-level per-frame dispatch
//!
//! Owns every piece of run state (engine, player, attacks, rage, shield,
//! score). Nothing else mutates it. Playing frames resolve in this order:
//!
//! 1. Snapshot rage and invincibility for the frame
//! 2. Player kinetics
//! 3. Engine update (spawn, scroll, car-vs-crash)
//! 4. Melee and ranged attacks
//! 5. Player vs hazards
//! 6. Score, rage and death bookkeeping
//! 7. Rage and recovery timers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attack::Attacks;
use super::difficulty::DifficultyRamp;
use super::engine::{ContactMode, FrameContext, Hit, LaneWarning, ObstacleEngine};
use super::events::EventSink;
use super::input::InputSource;
use super::obstacle::ObstacleType;
use super::phase::{PhaseKind, Reveal, RunPhase};
use super::player::{KineticsInput, Player};
use super::rage::{RageState, ShieldState};
use super::rng::CosmeticRng;
use super::road::Road;
use crate::consts::{LANE_COUNT, MAX_FRAME_DT};
use crate::leaderboard::Leaderboard;
use crate::tuning::Tuning;

/// Pickups delivered by the pickup collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pickup {
    RageFuel,
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Boundary,
    Hazard(ObstacleType),
}

pub struct RunStateMachine {
    tuning: Tuning,
    seed: u64,
    phase: RunPhase,
    road: Road,
    engine: ObstacleEngine,
    player: Player,
    attacks: Attacks,
    rage: RageState,
    shield: ShieldState,
    ramp: DifficultyRamp,
    elapsed: f32,
    distance: f32,
    bonus: u64,
    kills: u32,
    /// Slow-zone overlap from the previous frame's contact pass
    in_slow: bool,
    death_cause: Option<DeathCause>,
    /// One-shot: start cutscene finished; consumed by the next Starting update
    cutscene_done: bool,
}

impl RunStateMachine {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_cosmetic(tuning, seed, CosmeticRng::new())
    }

    pub fn with_cosmetic(tuning: Tuning, seed: u64, cosmetic: CosmeticRng) -> Self {
        let tuning = tuning.sanitized();
        let road = Road::new(&tuning.screen);
        let engine = ObstacleEngine::with_cosmetic(tuning.spawn.clone(), road.clone(), seed, cosmetic);
        let player = Player::new(tuning.kinetics.clone(), &road);
        Self {
            seed,
            phase: RunPhase::Title,
            engine,
            player,
            attacks: Attacks::new(tuning.attack.clone()),
            rage: RageState::new(tuning.rage.clone()),
            shield: ShieldState::default(),
            ramp: DifficultyRamp::new(&tuning.difficulty),
            elapsed: 0.0,
            distance: 0.0,
            bonus: 0,
            kills: 0,
            in_slow: false,
            death_cause: None,
            cutscene_done: false,
            road,
            tuning,
        }
    }

    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed used by the next run start or restart
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn engine(&self) -> &ObstacleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ObstacleEngine {
        &mut self.engine
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn attacks(&self) -> &Attacks {
        &self.attacks
    }

    pub fn rage(&self) -> &RageState {
        &self.rage
    }

    pub fn shield(&self) -> &ShieldState {
        &self.shield
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    pub fn difficulty(&self) -> f32 {
        self.ramp.factor(self.elapsed)
    }

    pub fn road_speed(&self) -> f32 {
        self.ramp.road_speed(self.difficulty())
    }

    /// Distance score plus kill bonuses
    pub fn score(&self) -> u64 {
        (self.distance.max(0.0) * self.tuning.scoring.points_per_px) as u64 + self.bonus
    }

    pub fn camera_scale(&self) -> f32 {
        self.rage.camera_scale()
    }

    /// Off-screen hazard warnings, one slot per lane
    pub fn warnings(&self) -> [Option<LaneWarning>; LANE_COUNT] {
        self.engine.upcoming_per_lane(self.road_speed())
    }

    /// The start cutscene finished playing
    pub fn signal_cutscene_complete(&mut self) {
        if self.phase_kind() == PhaseKind::Starting {
            self.cutscene_done = true;
        }
    }

    /// The melee swing animation finished playing
    pub fn signal_melee_finished(&mut self) {
        self.attacks.signal_melee_finished();
    }

    pub fn apply_pickup(&mut self, pickup: Pickup) {
        if self.phase_kind() != PhaseKind::Playing {
            return;
        }
        match pickup {
            Pickup::RageFuel => {
                self.rage.add(self.tuning.rage.pickup_gain);
            }
            Pickup::Shield => self.shield.grant(),
        }
    }

    /// Reset every component together
    fn reset_run(&mut self) {
        self.engine.reset(self.seed);
        self.player.reset(&self.road);
        self.attacks.reset();
        self.rage.reset();
        self.shield.reset();
        self.elapsed = 0.0;
        self.distance = 0.0;
        self.bonus = 0;
        self.kills = 0;
        self.in_slow = false;
        self.death_cause = None;
        self.cutscene_done = false;
    }

    /// Move to `kind` with fresh phase state.
    ///
    /// Illegal edges are caller bugs and trip a debug assertion.
    pub fn enter(&mut self, kind: PhaseKind, events: &mut dyn EventSink) {
        let from = self.phase_kind();
        debug_assert!(
            from.can_enter(kind),
            "invalid phase transition {:?} -> {:?}",
            from,
            kind
        );
        log::info!("phase {:?} -> {:?}", from, kind);
        self.phase = RunPhase::enter(kind, &self.tuning.timings);
        events.on_phase_change(from, kind);
    }

    /// Title -> Tutorial (or straight to the countdown)
    pub fn start(&mut self, events: &mut dyn EventSink) {
        if self.phase_kind() != PhaseKind::Title {
            return;
        }
        self.reset_run();
        log::info!("run start, seed {}", self.seed);
        let next = if self.tuning.timings.show_tutorial {
            PhaseKind::Tutorial
        } else {
            PhaseKind::Starting
        };
        self.enter(next, events);
    }

    /// Dead -> Playing, skipping title and countdown
    pub fn restart(&mut self, events: &mut dyn EventSink) {
        if self.phase_kind() != PhaseKind::Dead {
            return;
        }
        self.reset_run();
        log::info!("run restart, seed {}", self.seed);
        self.enter(PhaseKind::Playing, events);
    }

    /// Abandon whatever is happening and go back to the title
    pub fn return_to_title(&mut self, events: &mut dyn EventSink) {
        if self.phase_kind() == PhaseKind::Title {
            return;
        }
        self.reset_run();
        self.enter(PhaseKind::Title, events);
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        dt: f32,
        input: &mut dyn InputSource,
        events: &mut dyn EventSink,
        leaderboard: &dyn Leaderboard,
    ) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

        if input.consume_back() && self.phase_kind() != PhaseKind::Title {
            self.return_to_title(events);
            return;
        }

        let score = self.score();
        let next = match &mut self.phase {
            RunPhase::Title => {
                if input.consume_confirm() || input.consume_tap() {
                    self.start(events);
                }
                None
            }
            RunPhase::Tutorial(tutorial) => {
                if input.consume_skip() {
                    tutorial.skip();
                }
                let advance = input.consume_confirm() || input.consume_tap();
                tutorial.update(dt, advance).then_some(PhaseKind::Starting)
            }
            RunPhase::Starting(countdown) => {
                let done = std::mem::take(&mut self.cutscene_done);
                countdown.update(dt, done).then_some(PhaseKind::Playing)
            }
            RunPhase::Playing => {
                self.update_playing(dt, input, events);
                None
            }
            RunPhase::Dying(death) => {
                let reveal = death.update(dt, || {
                    if leaderboard.qualifies(score) && !leaderboard.has_identity() {
                        Reveal::NameEntry
                    } else {
                        Reveal::Dead
                    }
                });
                reveal.map(|r| match r {
                    Reveal::NameEntry => PhaseKind::NameEntry,
                    Reveal::Dead => PhaseKind::Dead,
                })
            }
            RunPhase::NameEntry => input.consume_confirm().then_some(PhaseKind::Dead),
            RunPhase::Dead => {
                if input.consume_confirm() || input.consume_tap() {
                    self.restart(events);
                }
                None
            }
        };

        if let Some(kind) = next {
            self.enter(kind, events);
        }
    }

    fn update_playing(&mut self, dt: f32, input: &mut dyn InputSource, events: &mut dyn EventSink) {
        let rage_active = self.rage.is_active();
        let recovering = self.shield.is_recovering();
        self.player.invincible = rage_active || recovering;

        self.elapsed += dt;
        let difficulty = self.ramp.factor(self.elapsed);
        let road_speed = self.ramp.road_speed(difficulty);

        if input.consume_attack() {
            self.attacks.try_melee();
        }
        if input.consume_ranged() {
            let origin = self.player.pos + Vec2::new(self.player.radius, 0.0);
            let lane = self.player.lane(&self.road);
            self.attacks.try_ranged(origin, lane);
        }

        let kinetics = KineticsInput {
            hold: input.is_hold_active(),
            tap: input.consume_tap(),
            arrow: input.lateral_arrow_direction(),
            pointer_target: input.lateral_pointer_target(),
            in_slow: self.in_slow,
        };
        let outcome = self.player.update(&kinetics, road_speed, &self.road, dt);
        self.distance += outcome.distance;

        let ctx = FrameContext {
            difficulty,
            road_speed,
            rage_active,
        };
        self.engine.update(dt, &ctx, events);

        // Attacks first: a hazard destroyed here can't touch the player
        self.attacks.update(dt, self.road.width);
        let lane = self.player.lane(&self.road);
        let hits = self.attacks.resolve(&mut self.engine, self.player.pos, lane, events);
        self.credit_hits(&hits);

        if outcome.boundary_death {
            self.die(DeathCause::Boundary, events);
            return;
        }

        let mode = if rage_active {
            ContactMode::Destructive
        } else if recovering {
            ContactMode::Ghost
        } else {
            ContactMode::Lethal {
                shielded: self.shield.charged,
            }
        };
        let contact = self
            .engine
            .check_player(self.player.pos, self.player.radius, mode, events);
        self.in_slow = contact.in_slow;
        self.credit_hits(&contact.hits);

        if contact.shield_absorbed.is_some() {
            self.shield.absorb(self.tuning.rage.shield_recovery);
        }
        if let Some(hit) = contact.crashed {
            if self.player.kill() {
                self.die(DeathCause::Hazard(hit.ty), events);
                return;
            }
        }

        self.rage.tick(dt);
        self.shield.tick(dt);
    }

    fn credit_hits(&mut self, hits: &[Hit]) {
        let scoring = &self.tuning.scoring;
        for hit in hits {
            let bonus = match hit.ty {
                ObstacleType::Crash => scoring.crash_kill_bonus,
                ObstacleType::Car => scoring.car_kill_bonus,
                ObstacleType::Slow => 0,
            };
            self.bonus += bonus;
            self.kills += 1;
            self.rage.add(self.tuning.rage.kill_gain);
        }
    }

    fn die(&mut self, cause: DeathCause, events: &mut dyn EventSink) {
        self.player.alive = false;
        self.death_cause = Some(cause);
        log::info!(
            "run over: {:?}, score {} after {:.1}s ({} kills)",
            cause,
            self.score(),
            self.elapsed,
            self.kills
        );
        self.enter(PhaseKind::Dying, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::events::GameEvent;
    use crate::sim::input::FrameInput;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};

    struct StubBoard {
        qualifies: bool,
        identity: bool,
    }

    impl Leaderboard for StubBoard {
        fn qualifies(&self, _score: u64) -> bool {
            self.qualifies
        }

        fn has_identity(&self) -> bool {
            self.identity
        }
    }

    const OPEN: StubBoard = StubBoard {
        qualifies: true,
        identity: false,
    };

    fn machine(show_tutorial: bool) -> RunStateMachine {
        let mut tuning = Tuning::default();
        tuning.timings.show_tutorial = show_tutorial;
        RunStateMachine::with_cosmetic(tuning, 12345, CosmeticRng::with_seed(7))
    }

    /// Drive a machine from Title into Playing
    fn playing() -> RunStateMachine {
        let mut sm = machine(false);
        sm.start(&mut ());
        for _ in 0..1000 {
            if sm.phase_kind() == PhaseKind::Playing {
                break;
            }
            sm.signal_cutscene_complete();
            sm.update(SIM_DT, &mut FrameInput::default(), &mut (), &OPEN);
        }
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        sm
    }

    fn crash_on_player(sm: &mut RunStateMachine) {
        let size = Vec2::splat(70.0);
        let pos = sm.player().pos - size * 0.5;
        let lane = sm.player().lane(sm.road());
        sm.engine_mut().insert(Obstacle {
            kind: ObstacleKind::Crash,
            pos,
            size,
            lane,
            active: true,
        });
    }

    fn holding() -> FrameInput {
        FrameInput {
            hold: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_title_through_tutorial_to_playing() {
        let mut sm = machine(true);
        let mut events: Vec<GameEvent> = Vec::new();
        let mut input = FrameInput {
            confirm: true,
            ..Default::default()
        };
        sm.update(SIM_DT, &mut input, &mut events, &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Tutorial);

        let mut input = FrameInput {
            skip: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            if sm.phase_kind() == PhaseKind::Playing {
                break;
            }
            sm.signal_cutscene_complete();
            sm.update(SIM_DT, &mut input, &mut events, &OPEN);
        }
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);

        let phases: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChange { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![PhaseKind::Tutorial, PhaseKind::Starting, PhaseKind::Playing]
        );
    }

    #[test]
    fn test_idle_player_drifts_into_boundary() {
        let mut sm = playing();
        for _ in 0..120 {
            sm.update(SIM_DT, &mut FrameInput::default(), &mut (), &OPEN);
            if sm.phase_kind() != PhaseKind::Playing {
                break;
            }
        }
        assert_eq!(sm.phase_kind(), PhaseKind::Dying);
        assert_eq!(sm.death_cause(), Some(DeathCause::Boundary));
        assert!(!sm.player().alive);
    }

    #[test]
    fn test_unshielded_crash_kills() {
        let mut sm = playing();
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Dying);
        assert_eq!(sm.death_cause(), Some(DeathCause::Hazard(ObstacleType::Crash)));
    }

    #[test]
    fn test_shield_absorbs_then_recovery_passes_through() {
        let mut sm = playing();
        sm.apply_pickup(Pickup::Shield);
        crash_on_player(&mut sm);
        let mut events: Vec<GameEvent> = Vec::new();
        sm.update(SIM_DT, &mut holding(), &mut events, &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert!(!sm.shield().charged);
        assert!(sm.shield().is_recovering());
        assert!(events.iter().any(|e| matches!(e, GameEvent::Explosion(_))));

        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert!(sm.player().invincible);
    }

    #[test]
    fn test_rage_destroys_and_scores() {
        let mut sm = playing();
        for _ in 0..4 {
            sm.apply_pickup(Pickup::RageFuel);
        }
        assert!(sm.rage().is_active());
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert_eq!(sm.kills(), 1);
        assert!(sm.score() >= sm.tuning().scoring.crash_kill_bonus);
    }

    #[test]
    fn test_rage_lasts_through_final_frame() {
        let mut sm = playing();
        for _ in 0..4 {
            sm.apply_pickup(Pickup::RageFuel);
        }
        // Leave a sliver of rage shorter than one frame
        sm.rage.timer = SIM_DT * 0.5;
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert_eq!(sm.kills(), 1);
        assert!(!sm.rage().is_active());
    }

    #[test]
    fn test_melee_kill_before_contact() {
        let mut sm = playing();
        crash_on_player(&mut sm);
        let mut input = FrameInput {
            hold: true,
            attack: true,
            ..Default::default()
        };
        sm.update(SIM_DT, &mut input, &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert_eq!(sm.kills(), 1);
    }

    #[test]
    fn test_dying_reveals_name_entry_once() {
        let mut sm = playing();
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        for _ in 0..1000 {
            if sm.phase_kind() != PhaseKind::Dying {
                break;
            }
            sm.update(SIM_DT, &mut FrameInput::default(), &mut (), &OPEN);
        }
        assert_eq!(sm.phase_kind(), PhaseKind::NameEntry);

        let mut confirm = FrameInput {
            confirm: true,
            ..Default::default()
        };
        sm.update(SIM_DT, &mut confirm, &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Dead);
    }

    #[test]
    fn test_known_player_skips_name_entry() {
        let board = StubBoard {
            qualifies: true,
            identity: true,
        };
        let mut sm = playing();
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &board);
        for _ in 0..1000 {
            if sm.phase_kind() != PhaseKind::Dying {
                break;
            }
            sm.update(SIM_DT, &mut FrameInput::default(), &mut (), &board);
        }
        assert_eq!(sm.phase_kind(), PhaseKind::Dead);
    }

    #[test]
    fn test_restart_goes_straight_to_playing() {
        let board = StubBoard {
            qualifies: false,
            identity: false,
        };
        let mut sm = playing();
        crash_on_player(&mut sm);
        sm.update(SIM_DT, &mut holding(), &mut (), &board);
        while sm.phase_kind() == PhaseKind::Dying {
            sm.update(SIM_DT, &mut FrameInput::default(), &mut (), &board);
        }
        assert_eq!(sm.phase_kind(), PhaseKind::Dead);

        let mut events: Vec<GameEvent> = Vec::new();
        let mut tap = FrameInput {
            tap: true,
            ..Default::default()
        };
        sm.update(SIM_DT, &mut tap, &mut events, &board);
        assert_eq!(sm.phase_kind(), PhaseKind::Playing);
        assert_eq!(
            events,
            vec![GameEvent::PhaseChange {
                from: PhaseKind::Dead,
                to: PhaseKind::Playing
            }]
        );
        assert!(sm.player().alive);
        assert_eq!(sm.score(), 0);
        assert_eq!(sm.engine().active_count(), 0);
    }

    #[test]
    fn test_back_returns_to_title_and_resets() {
        let mut sm = playing();
        for _ in 0..30 {
            sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
        }
        assert!(sm.elapsed() > 0.0);
        let mut back = FrameInput {
            back: true,
            ..Default::default()
        };
        sm.update(SIM_DT, &mut back, &mut (), &OPEN);
        assert_eq!(sm.phase_kind(), PhaseKind::Title);
        assert_eq!(sm.elapsed(), 0.0);
        assert_eq!(sm.engine().active_count(), 0);
    }

    #[test]
    fn test_struct_built_tuning_is_repaired() {
        let mut tuning = Tuning::default();
        tuning.rage.max_amount = 0.0;
        tuning.timings.countdown_from = 0;
        let sm = RunStateMachine::with_cosmetic(tuning, 1, CosmeticRng::with_seed(7));
        assert_eq!(sm.tuning().rage.max_amount, 1.0);
        assert_eq!(sm.tuning().timings.countdown_from, 2);
        assert!(sm.rage().fill().is_finite());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut sm = playing();
            let mut spawned = Vec::new();
            for _ in 0..600 {
                sm.update(SIM_DT, &mut holding(), &mut (), &OPEN);
                if sm.phase_kind() != PhaseKind::Playing {
                    break;
                }
                spawned.push(sm.engine().waves_spawned());
            }
            (spawned, sm.engine().rng().cursor(), sm.phase_kind())
        };
        assert_eq!(run(), run());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid phase transition")]
    fn test_invalid_transition_asserts() {
        let mut sm = machine(false);
        sm.enter(PhaseKind::NameEntry, &mut ());
    }
}
