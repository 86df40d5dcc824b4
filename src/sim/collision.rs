//! Collision detection between the ship and the iceberg
//!
//! Widths and positions are layout concerns, so the check always works on
//! live measured edges supplied by a [`Geometry`] provider.

use super::state::{AnimEvent, AnimationState, Phase};

/// Edges measured in the same coordinate space as the ship offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    /// Right edge of the ship (post-transform)
    pub ship_right: f64,
    /// Left edge of the iceberg
    pub iceberg_left: f64,
}

/// Read-only access to the current layout.
///
/// Either edge may be unavailable while elements are not laid out yet.
pub trait Geometry {
    fn ship_right_edge(&self) -> Option<f64>;
    fn iceberg_left_edge(&self) -> Option<f64>;

    /// Both edges, or `None` if either is missing
    fn extents(&self) -> Option<Extents> {
        Some(Extents {
            ship_right: self.ship_right_edge()?,
            iceberg_left: self.iceberg_left_edge()?,
        })
    }
}

/// Result of a collision check
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Whether the edges touch or cross
    pub hit: bool,
    /// How far the ship's right edge is past the iceberg's left edge
    pub overlap: f64,
    /// Offset at which the two just touch (only meaningful on hit)
    pub corrected_offset: f64,
}

/// Check the ship against the iceberg at `offset`.
pub fn check_collision(offset: f64, extents: Extents) -> CollisionResult {
    let overlap = extents.ship_right - extents.iceberg_left;
    CollisionResult {
        hit: overlap >= 0.0,
        overlap,
        corrected_offset: offset - overlap,
    }
}

/// Run one collision observation against the current state.
///
/// No-op outside `Sailing`. A missing edge skips the check for this frame.
/// On hit, records the corrected offset and enters `Colliding`; returns true.
pub fn observe<G: Geometry + ?Sized>(state: &mut AnimationState, geometry: &G) -> bool {
    if state.phase != Phase::Sailing {
        return false;
    }

    let Some(extents) = geometry.extents() else {
        log::debug!("Layout not ready, skipping collision check at offset {}", state.offset);
        return false;
    };

    let result = check_collision(state.offset, extents);
    if !result.hit {
        return false;
    }

    state.collision_offset = Some(result.corrected_offset);
    state.phase = Phase::Colliding;
    state.events.push(AnimEvent::Collided {
        offset: result.corrected_offset,
        overlap: result.overlap,
    });
    true
}
