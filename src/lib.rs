//! Titanic - a ship sails toward an iceberg, collides and splits in two
//!
//! Core modules:
//! - `sim`: Deterministic animation state machine (phases, ticker, collision)
//! - `platform`: Browser glue (DOM scene, interval handles, clock)
//! - `settings`: Ticker speed and persisted preferences

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SpeedPreset};
pub use sim::{Animation, Frame, Phase};

/// Animation configuration constants
pub mod consts {
    /// Horizontal distance the ship moves per ticker period (pixels)
    pub const TICK_STEP_PX: f64 = 4.0;
    /// Ticker period (milliseconds)
    pub const TICK_PERIOD_MS: f64 = 30.0;
    /// Maximum ticks run per poll before the backlog is dropped
    pub const MAX_CATCHUP_TICKS: u32 = 8;

    /// How long the crash animation plays before the hull splits (headless demo only;
    /// in the browser the CSS animation decides)
    pub const CRASH_DURATION_MS: f64 = 800.0;
}
