//! Lane Rush entry point
//!
//! Native builds run a headless autopilot over one seeded run and log the
//! outcome. The browser build drives the simulation through `lane_rush::wasm`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use lane_rush::consts::{MAX_SUBSTEPS, SIM_DT};
    use lane_rush::sim::{
        EventSink, FrameInput, ObstacleType, PhaseKind, Pickup, RunStateMachine,
    };
    use lane_rush::{HighScores, Tuning};

    /// Host frame length; two sim steps per frame
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// How far ahead of the player the autopilot looks for hazards (px)
    const LOOKAHEAD: f32 = 420.0;

    /// Collects side effects; pickups are auto-collected next frame
    #[derive(Default)]
    struct RunLog {
        explosions: u32,
        pending: Vec<Pickup>,
    }

    impl EventSink for RunLog {
        fn on_explosion(&mut self, _pos: Vec2) {
            self.explosions += 1;
        }

        fn on_pickup_spawn(&mut self, _pos: Vec2) {
            self.pending.push(Pickup::RageFuel);
        }

        fn on_shield_spawn(&mut self, _pos: Vec2) {
            self.pending.push(Pickup::Shield);
        }

        fn on_phase_change(&mut self, from: PhaseKind, to: PhaseKind) {
            log::debug!("{:?} -> {:?}", from, to);
        }
    }

    /// Simple demo player: hold the throttle, dodge into a clear lane, swing
    /// at anything it can't dodge
    struct Autopilot {
        frame: u64,
    }

    impl Autopilot {
        fn lane_blocked(sm: &RunStateMachine, lane: usize) -> bool {
            let player = sm.player();
            sm.engine().obstacles().iter().any(|o| {
                o.can_collide()
                    && o.lane == lane
                    && o.ty() != ObstacleType::Slow
                    && o.pos.x + o.size.x > player.pos.x - player.radius
                    && o.pos.x < player.pos.x + LOOKAHEAD
            })
        }

        fn input(&mut self, sm: &RunStateMachine) -> FrameInput {
            self.frame += 1;
            let mut input = FrameInput {
                hold: true,
                ..Default::default()
            };

            match sm.phase_kind() {
                PhaseKind::Title | PhaseKind::NameEntry => input.confirm = true,
                PhaseKind::Tutorial => input.skip = true,
                PhaseKind::Playing => {
                    let road = sm.road();
                    let lane = sm.player().lane(road);
                    let target = if Self::lane_blocked(sm, lane) {
                        (0..road.lane_count())
                            .filter(|&l| !Self::lane_blocked(sm, l))
                            .min_by_key(|&l| l.abs_diff(lane))
                            .unwrap_or(lane)
                    } else {
                        lane
                    };
                    input.pointer_target = Some(road.lane_center(target));
                    input.attack = target == lane && Self::lane_blocked(sm, lane);
                    input.ranged = self.frame % 45 == 0;

                    let behind = sm.player().pos.x < sm.tuning().kinetics.start_x;
                    input.tap = behind && self.frame % 6 == 0;
                }
                _ => {}
            }
            input
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let seed: u64 = match args.next() {
            Some(s) => s.parse()?,
            None => 12345,
        };
        let tuning = match args.next() {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
            None => Tuning::default(),
        };
        let max_seconds: f32 = match args.next() {
            Some(s) => s.parse()?,
            None => 300.0,
        };

        log::info!("Lane Rush (headless) seed {}", seed);

        let mut sm = RunStateMachine::new(tuning, seed);
        let mut scores = HighScores::new();
        let mut sink = RunLog::default();
        let mut pilot = Autopilot { frame: 0 };
        let mut accumulator = 0.0f32;
        let mut clock = 0.0f32;

        while clock < max_seconds {
            clock += FRAME_DT;
            accumulator += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                for pickup in std::mem::take(&mut sink.pending) {
                    sm.apply_pickup(pickup);
                }
                sm.signal_cutscene_complete();

                let mut input = pilot.input(&sm);
                sm.update(SIM_DT, &mut input, &mut sink, &scores);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            if sm.phase_kind() == PhaseKind::Dead {
                break;
            }
        }

        let score = sm.score();
        match scores.add_score("autopilot", score, sm.elapsed()) {
            Some(rank) => log::info!("rank #{}", rank),
            None => log::info!("score did not qualify"),
        }
        println!(
            "seed {} survived {:.1}s score {} kills {} explosions {} cause {:?}",
            seed,
            sm.elapsed(),
            score,
            sm.kills(),
            sink.explosions,
            sm.death_cause()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is lane_rush::wasm::start, this is just to satisfy the compiler
}
