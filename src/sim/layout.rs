//! Presentation contract and a model layout
//!
//! The browser implements these traits on real DOM elements
//! (see `platform::web::DomScene`). `FixedLayout` models the same scene with
//! plain numbers for the headless demo and tests.

use super::collision::Geometry;
use super::state::{Frame, Phase};

/// Receives every committed frame before geometry is measured
pub trait Presenter {
    fn present(&mut self, frame: Frame);
}

/// Something that can both draw frames and report their measured extents
pub trait Scene: Geometry + Presenter {}

impl<T: Geometry + Presenter + ?Sized> Scene for T {}

/// Scene laid out on a single horizontal axis
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLayout {
    /// Left edge of the ship at offset 0
    pub ship_left: f64,
    /// Hull width
    pub ship_width: f64,
    /// Left edge of the iceberg
    pub iceberg_left: f64,
    /// Whether elements have been laid out yet
    pub laid_out: bool,
    /// Last presented frame
    pub frame: Frame,
    /// Number of frames presented
    pub frames: u64,
}

impl FixedLayout {
    pub fn new(ship_left: f64, ship_width: f64, iceberg_left: f64) -> Self {
        Self {
            ship_left,
            ship_width,
            iceberg_left,
            laid_out: true,
            frame: Frame {
                phase: Phase::Idle,
                offset: 0.0,
            },
            frames: 0,
        }
    }

    /// Layout that reports no geometry until `laid_out` is set
    pub fn unmeasured(ship_left: f64, ship_width: f64, iceberg_left: f64) -> Self {
        Self {
            laid_out: false,
            ..Self::new(ship_left, ship_width, iceberg_left)
        }
    }

    /// Raw offset at which the hull first touches the iceberg
    pub fn contact_offset(&self) -> f64 {
        self.iceberg_left - (self.ship_left + self.ship_width)
    }
}

impl Default for FixedLayout {
    /// 160px hull docked at the left, iceberg 600px out
    fn default() -> Self {
        Self::new(0.0, 160.0, 600.0)
    }
}

impl Geometry for FixedLayout {
    fn ship_right_edge(&self) -> Option<f64> {
        self.laid_out
            .then(|| self.ship_left + self.ship_width + self.frame.offset)
    }

    fn iceberg_left_edge(&self) -> Option<f64> {
        self.laid_out.then_some(self.iceberg_left)
    }
}

impl Presenter for FixedLayout {
    fn present(&mut self, frame: Frame) {
        self.frame = frame;
        self.frames += 1;
    }
}
