//! Animation state and core types
//!
//! Everything the presentation layer reads lives here. Mutation happens only
//! through [`crate::sim::Animation`].

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Docked at the origin, nothing moves
    #[default]
    Idle,
    /// Ticker running, ship advancing toward the iceberg
    Sailing,
    /// Hit the iceberg, crash animation playing
    Colliding,
    /// Crash animation done, hull shown as two halves
    Split,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Sailing => "sailing",
            Phase::Colliding => "colliding",
            Phase::Split => "split",
        }
    }

    /// Whether the crash animation should be playing on the whole hull
    pub fn plays_crash(&self) -> bool {
        *self == Phase::Colliding
    }

    /// Whether the hull is rendered as two halves
    pub fn shows_split_hull(&self) -> bool {
        *self == Phase::Split
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transitions reported to the host, drained after each command or poll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimEvent {
    /// A new run started from the origin
    Launched,
    /// Back to idle
    Reset,
    /// Ship touched the iceberg at this corrected offset
    Collided { offset: f64, overlap: f64 },
    /// Hull split after the crash animation
    Split,
}

/// What the presentation layer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub phase: Phase,
    /// Effective displayed offset (pixels)
    pub offset: f64,
}

/// Complete animation state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationState {
    /// Current phase
    pub phase: Phase,
    /// Raw horizontal offset accumulated while sailing
    pub offset: f64,
    /// Corrected offset captured when the collision was detected
    pub collision_offset: Option<f64>,
    /// Ticks applied during the current run
    pub ticks: u64,
    /// Pending events for the host
    #[serde(skip)]
    pub events: Vec<AnimEvent>,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the ship is drawn at.
    ///
    /// While sailing this is the raw offset. Afterwards the collision offset
    /// wins, falling back to the raw offset if none was recorded.
    pub fn displayed_offset(&self) -> f64 {
        match self.phase {
            Phase::Sailing => self.offset,
            _ => self.collision_offset.unwrap_or(self.offset),
        }
    }

    pub fn frame(&self) -> Frame {
        Frame {
            phase: self.phase,
            offset: self.displayed_offset(),
        }
    }

    /// Clear the run and enter `phase`
    pub(crate) fn rewind(&mut self, phase: Phase) {
        self.offset = 0.0;
        self.collision_offset = None;
        self.ticks = 0;
        self.phase = phase;
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<AnimEvent> {
        std::mem::take(&mut self.events)
    }
}
