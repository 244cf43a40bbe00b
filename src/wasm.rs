//! Browser entry point
//!
//! A JS host owns rendering, audio and the leaderboard service. It feeds
//! input through the setters, calls `update` once per animation frame and
//! reads state back as plain numbers or JSON.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::leaderboard::HighScores;
use crate::sim::{
    FrameClock, FrameInput, GameEvent, LaneWarning, Obstacle, PhaseKind, PhaseView, Pickup,
    RunStateMachine,
};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Lane Rush starting...");
}

/// Snapshot handed to the renderer each frame
#[derive(Serialize)]
struct Frame<'a> {
    phase: PhaseKind,
    view: PhaseView,
    score: u64,
    player: [f32; 2],
    speed_multiplier: f32,
    tap_pressure: f32,
    rage_fill: f32,
    rage_active: bool,
    shield: bool,
    camera_scale: f32,
    zoom_progress: f32,
    obstacles: Vec<&'a Obstacle>,
    warnings: Vec<LaneWarning>,
    explosions: Vec<[f32; 2]>,
    events: &'a [GameEvent],
}

#[wasm_bindgen]
pub struct WasmRun {
    sm: RunStateMachine,
    input: FrameInput,
    scores: HighScores,
    events: Vec<GameEvent>,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WasmRun {
    /// New run on the title screen. `tuning_json` may be partial.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: Option<String>) -> Result<WasmRun, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        Ok(Self {
            sm: RunStateMachine::new(tuning, seed),
            input: FrameInput::default(),
            scores: HighScores::new(),
            events: Vec::new(),
            clock: FrameClock::new(),
        })
    }

    /// Advance by the host frame delta in seconds
    pub fn update(&mut self, dt: f32) {
        self.events.clear();
        self.clock
            .advance(dt, &mut self.sm, &mut self.input, &mut self.events, &self.scores);
    }

    pub fn set_hold(&mut self, down: bool) {
        self.input.hold = down;
    }

    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    pub fn attack(&mut self) {
        self.input.attack = true;
    }

    pub fn ranged(&mut self) {
        self.input.ranged = true;
    }

    /// -1 up, 0 released, 1 down
    pub fn set_arrow(&mut self, dir: i8) {
        self.input.arrow = dir.signum();
    }

    pub fn set_pointer(&mut self, y: f32) {
        self.input.pointer_target = Some(y);
    }

    pub fn confirm(&mut self) {
        self.input.confirm = true;
    }

    pub fn skip(&mut self) {
        self.input.skip = true;
    }

    pub fn back(&mut self) {
        self.input.back = true;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.sm.set_seed(seed);
    }

    pub fn cutscene_complete(&mut self) {
        self.sm.signal_cutscene_complete();
    }

    pub fn melee_finished(&mut self) {
        self.sm.signal_melee_finished();
    }

    pub fn collect_rage_fuel(&mut self) {
        self.sm.apply_pickup(Pickup::RageFuel);
    }

    pub fn collect_shield(&mut self) {
        self.sm.apply_pickup(Pickup::Shield);
    }

    /// Record the player's name for the finished run
    pub fn submit_name(&mut self, name: &str) -> Option<u32> {
        let rank = self.scores.add_score(name, self.sm.score(), self.sm.elapsed());
        if let Ok(json) = self.scores.to_json() {
            log::debug!("leaderboard: {}", json);
        }
        rank.map(|r| r as u32)
    }

    pub fn load_scores(&mut self, json: &str) -> Result<(), JsValue> {
        self.scores = HighScores::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        self.scores
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Everything the renderer needs for this frame, as JSON
    pub fn frame_json(&mut self) -> Result<String, JsValue> {
        let explosions = self
            .sm
            .engine_mut()
            .take_explosion_requests()
            .into_iter()
            .map(|p| [p.x, p.y])
            .collect();
        let player = self.sm.player();
        let frame = Frame {
            phase: self.sm.phase_kind(),
            view: self.sm.phase().view(),
            score: self.sm.score(),
            player: [player.pos.x, player.pos.y],
            speed_multiplier: player.speed_multiplier(),
            tap_pressure: player.tap_pressure(),
            rage_fill: self.sm.rage().fill(),
            rage_active: self.sm.rage().is_active(),
            shield: self.sm.shield().charged,
            camera_scale: self.sm.camera_scale(),
            zoom_progress: self.sm.rage().zoom_progress(),
            obstacles: self.sm.engine().obstacles().iter().filter(|o| o.active).collect(),
            warnings: self.sm.warnings().into_iter().flatten().collect(),
            explosions,
            events: &self.events,
        };
        serde_json::to_string(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
