//! Crop selection domain — pure logic over frame coordinates.
//!
//! Nothing here knows about windows, canvases or event loops. The
//! caller feeds pointer positions in, and reads a rectangle out.

mod mapper;
mod state;

pub use mapper::{map_to_frame, ClientPoint, DisplayBox};
pub use state::{DragHandler, SelectionMachine, SelectionPhase};

use serde::{Deserialize, Serialize};

/// Both sides of a selection must exceed this many frame pixels
/// before it can be submitted.
pub const MIN_SELECTION_SIZE: f64 = 10.0;

/// A position in frame space (captured image pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FramePoint {
    pub x: f64,
    pub y: f64,
}

impl FramePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width] x [0, height]`.
    pub fn clamped(self, width: u32, height: u32) -> Self {
        Self {
            x: self.x.clamp(0.0, width as f64),
            y: self.y.clamp(0.0, height as f64),
        }
    }
}

/// Axis-aligned selection rectangle in frame space.
///
/// `w` and `h` are never negative. A rectangle with zero width or
/// height means "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    /// Bounding box of two corner points.
    pub fn from_corners(a: FramePoint, b: FramePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (b.x - a.x).abs(),
            h: (b.y - a.y).abs(),
        }
    }

    /// Zero-size rectangle anchored at a point.
    pub fn at(point: FramePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            w: 0.0,
            h: 0.0,
        }
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Strictly larger than [`MIN_SELECTION_SIZE`] on both axes.
    pub fn is_submittable(&self) -> bool {
        self.w > MIN_SELECTION_SIZE && self.h > MIN_SELECTION_SIZE
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}x{:.0} at {:.0},{:.0}", self.w, self.h, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_in_any_order_give_same_box() {
        let a = FramePoint::new(40.0, 10.0);
        let b = FramePoint::new(5.0, 70.0);
        let r1 = Rect::from_corners(a, b);
        let r2 = Rect::from_corners(b, a);
        assert_eq!(r1, r2);
        assert_eq!(r1, Rect::new(5.0, 10.0, 35.0, 60.0));
    }

    #[test]
    fn submittable_is_strict() {
        assert!(!Rect::new(0.0, 0.0, 10.0, 50.0).is_submittable());
        assert!(!Rect::new(0.0, 0.0, 50.0, 10.0).is_submittable());
        assert!(Rect::new(0.0, 0.0, 10.5, 10.5).is_submittable());
    }

    #[test]
    fn negative_sizes_are_floored() {
        let r = Rect::new(3.0, 3.0, -5.0, 2.0);
        assert_eq!(r.w, 0.0);
        assert!(!r.has_area());
    }

    #[test]
    fn clamp_keeps_points_on_frame() {
        let p = FramePoint::new(-4.0, 130.0).clamped(100, 120);
        assert_eq!(p, FramePoint::new(0.0, 120.0));
    }
}
