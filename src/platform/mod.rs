//! Platform abstraction layer
//!
//! Browser glue for the animation core:
//! - Monotonic clock (`performance.now()`)
//! - Interval handles that clear themselves on drop
//! - DOM-backed scene (measured geometry + presentation)

#[cfg(target_arch = "wasm32")]
pub mod web;
