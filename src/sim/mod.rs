//! Deterministic animation module
//!
//! All lifecycle logic lives here. This module must stay pure:
//! - Time comes in from the caller as monotonic milliseconds
//! - Geometry comes in through the `Geometry` trait
//! - No DOM or platform dependencies

pub mod collision;
pub mod controller;
pub mod layout;
pub mod state;
pub mod ticker;

pub use collision::{CollisionResult, Extents, Geometry, check_collision, observe};
pub use controller::Animation;
pub use layout::{FixedLayout, Presenter, Scene};
pub use state::{AnimEvent, AnimationState, Frame, Phase};
pub use ticker::TickSchedule;
