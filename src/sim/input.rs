//! Input contract consumed by the run
//!
//! Every `consume_*` query is edge-triggered: it reports a discrete press at
//! most once, however many times it is asked.

use serde::{Deserialize, Serialize};

pub trait InputSource {
    /// Throttle held (key, button or touch down)
    fn is_hold_active(&self) -> bool;
    /// A tap happened since the last call
    fn consume_tap(&mut self) -> bool;
    /// Melee pressed since the last call
    fn consume_attack(&mut self) -> bool;
    /// Ranged pressed since the last call
    fn consume_ranged(&mut self) -> bool;
    /// -1 up, 0 none, 1 down
    fn lateral_arrow_direction(&self) -> i8;
    /// Latest pointer/touch row target, if one was reported this frame.
    /// The player keeps steering toward the last target until a new one
    /// arrives or the arrows take over.
    fn lateral_pointer_target(&self) -> Option<f32>;
    /// Advance / confirm (space, enter or tap on a menu)
    fn consume_confirm(&mut self) -> bool {
        false
    }
    /// Skip the current sequence
    fn consume_skip(&mut self) -> bool {
        false
    }
    /// Back to title
    fn consume_back(&mut self) -> bool {
        false
    }
}

/// Latched input for one host frame. The host sets flags as events arrive;
/// the run consumes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    pub hold: bool,
    pub tap: bool,
    pub attack: bool,
    pub ranged: bool,
    /// -1 up, 0 none, 1 down
    pub arrow: i8,
    pub pointer_target: Option<f32>,
    pub confirm: bool,
    pub skip: bool,
    pub back: bool,
}

impl FrameInput {
    /// Drop any unconsumed edges, keeping held state
    pub fn clear_edges(&mut self) {
        self.tap = false;
        self.attack = false;
        self.ranged = false;
        self.confirm = false;
        self.skip = false;
        self.back = false;
        self.pointer_target = None;
    }
}

impl InputSource for FrameInput {
    fn is_hold_active(&self) -> bool {
        self.hold
    }

    fn consume_tap(&mut self) -> bool {
        std::mem::take(&mut self.tap)
    }

    fn consume_attack(&mut self) -> bool {
        std::mem::take(&mut self.attack)
    }

    fn consume_ranged(&mut self) -> bool {
        std::mem::take(&mut self.ranged)
    }

    fn lateral_arrow_direction(&self) -> i8 {
        self.arrow.signum()
    }

    fn lateral_pointer_target(&self) -> Option<f32> {
        self.pointer_target
    }

    fn consume_confirm(&mut self) -> bool {
        std::mem::take(&mut self.confirm)
    }

    fn consume_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip)
    }

    fn consume_back(&mut self) -> bool {
        std::mem::take(&mut self.back)
    }
}
