//! Client space → frame space conversion.
//!
//! The displayed canvas is usually scaled by layout, so a pointer
//! position has to be rescaled by backing size / displayed size.

use super::FramePoint;

/// A pointer or touch position relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientPoint {
    pub x: f64,
    pub y: f64,
}

impl ClientPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the canvas sits on screen and how big it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Maps a client-space point into frame space.
///
/// `backing` is the canvas pixel size, which always equals the captured
/// frame's size. No clamping happens here; points outside the canvas map
/// outside the frame. Returns `None` when the display box has no area.
pub fn map_to_frame(
    point: ClientPoint,
    display: DisplayBox,
    backing: (u32, u32),
) -> Option<FramePoint> {
    if !(display.width > 0.0 && display.height > 0.0) {
        return None;
    }

    let scale_x = backing.0 as f64 / display.width;
    let scale_y = backing.1 as f64 / display.height;

    Some(FramePoint {
        x: (point.x - display.left) * scale_x,
        y: (point.y - display.top) * scale_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscaled_canvas_only_subtracts_offset() {
        let display = DisplayBox::new(20.0, 30.0, 640.0, 480.0);
        let p = map_to_frame(ClientPoint::new(120.0, 80.0), display, (640, 480)).unwrap();
        assert_eq!(p, FramePoint::new(100.0, 50.0));
    }

    #[test]
    fn half_size_canvas_doubles_coordinates() {
        let display = DisplayBox::new(0.0, 0.0, 320.0, 240.0);
        let p = map_to_frame(ClientPoint::new(100.0, 60.0), display, (640, 480)).unwrap();
        assert_eq!(p, FramePoint::new(200.0, 120.0));
    }

    #[test]
    fn same_relative_position_maps_identically_at_any_scale() {
        let backing = (1280, 720);
        let (fx, fy) = (0.3125, 0.625);
        let mut seen = Vec::new();

        for k in [0.25, 0.5, 1.0, 1.5, 3.0] {
            let display = DisplayBox::new(7.0, 11.0, 1280.0 * k, 720.0 * k);
            let client = ClientPoint::new(
                display.left + display.width * fx,
                display.top + display.height * fy,
            );
            seen.push(map_to_frame(client, display, backing).unwrap());
        }

        for p in &seen {
            assert!((p.x - 400.0).abs() < 1e-9, "x drifted: {:?}", p);
            assert!((p.y - 450.0).abs() < 1e-9, "y drifted: {:?}", p);
        }
    }

    #[test]
    fn points_outside_canvas_are_not_clamped() {
        let display = DisplayBox::new(10.0, 10.0, 100.0, 100.0);
        let p = map_to_frame(ClientPoint::new(0.0, 150.0), display, (100, 100)).unwrap();
        assert_eq!(p, FramePoint::new(-10.0, 140.0));
    }

    #[test]
    fn collapsed_display_box_is_rejected() {
        let display = DisplayBox::new(0.0, 0.0, 0.0, 200.0);
        assert!(map_to_frame(ClientPoint::new(5.0, 5.0), display, (100, 100)).is_none());
    }
}
