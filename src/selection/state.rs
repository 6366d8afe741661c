//! Drag-to-select state machine.
//!
//! IDLE → DRAGGING → READY, with a reset back to IDLE on every new
//! capture. READY means the frozen rectangle is big enough to submit.

use super::{FramePoint, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Dragging,
    Ready,
}

/// Capability interface for whatever dispatches pointer events.
///
/// Points are already in frame space. `on_drag_move` returns `true`
/// when the rectangle changed and the overlay should be redrawn.
pub trait DragHandler {
    fn on_drag_start(&mut self, point: FramePoint);
    fn on_drag_move(&mut self, point: FramePoint) -> bool;
    fn on_drag_end(&mut self);
}

/// Selection state for one captured frame.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    phase: SelectionPhase,
    start: FramePoint,
    rect: Rect,
    bounds: (u32, u32),
}

impl SelectionMachine {
    /// New machine for a frame of the given pixel size.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            phase: SelectionPhase::Idle,
            start: FramePoint::default(),
            rect: Rect::ZERO,
            bounds: (frame_width, frame_height),
        }
    }

    /// Drop any selection and adopt new frame bounds.
    pub fn reset(&mut self, frame_width: u32, frame_height: u32) {
        self.phase = SelectionPhase::Idle;
        self.start = FramePoint::default();
        self.rect = Rect::ZERO;
        self.bounds = (frame_width, frame_height);
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    pub fn can_submit(&self) -> bool {
        self.phase == SelectionPhase::Ready
    }

    fn clamp(&self, point: FramePoint) -> FramePoint {
        point.clamped(self.bounds.0, self.bounds.1)
    }
}

impl DragHandler for SelectionMachine {
    fn on_drag_start(&mut self, point: FramePoint) {
        let start = self.clamp(point);
        self.start = start;
        self.rect = Rect::at(start);
        self.phase = SelectionPhase::Dragging;
        log::debug!("[SELECT] Drag started at {:.1},{:.1}", start.x, start.y);
    }

    fn on_drag_move(&mut self, point: FramePoint) -> bool {
        if self.phase != SelectionPhase::Dragging {
            return false;
        }
        self.rect = Rect::from_corners(self.start, self.clamp(point));
        true
    }

    fn on_drag_end(&mut self) {
        if self.phase != SelectionPhase::Dragging {
            return;
        }

        if self.rect.is_submittable() {
            self.phase = SelectionPhase::Ready;
            log::info!("[SELECT] Selection ready: {}", self.rect);
        } else {
            self.phase = SelectionPhase::Idle;
            log::debug!("[SELECT] Selection too small to submit: {}", self.rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(m: &mut SelectionMachine, from: (f64, f64), to: (f64, f64)) {
        m.on_drag_start(FramePoint::new(from.0, from.1));
        m.on_drag_move(FramePoint::new(to.0, to.1));
        m.on_drag_end();
    }

    #[test]
    fn starts_idle_with_no_rect() {
        let m = SelectionMachine::new(640, 480);
        assert_eq!(m.phase(), SelectionPhase::Idle);
        assert_eq!(m.rect(), Rect::ZERO);
        assert!(!m.can_submit());
    }

    #[test]
    fn drag_start_zeroes_rect_and_blocks_submit() {
        let mut m = SelectionMachine::new(640, 480);
        drag(&mut m, (10.0, 10.0), (100.0, 100.0));
        assert!(m.can_submit());

        m.on_drag_start(FramePoint::new(300.0, 200.0));
        assert_eq!(m.phase(), SelectionPhase::Dragging);
        assert_eq!(m.rect(), Rect::new(300.0, 200.0, 0.0, 0.0));
        assert!(!m.can_submit());
    }

    #[test]
    fn rect_is_bounding_box_for_every_drag_direction() {
        let corners = [
            ((50.0, 60.0), (200.0, 180.0)),
            ((200.0, 180.0), (50.0, 60.0)),
            ((200.0, 60.0), (50.0, 180.0)),
            ((50.0, 180.0), (200.0, 60.0)),
        ];

        for (start, end) in corners {
            let mut m = SelectionMachine::new(640, 480);
            m.on_drag_start(FramePoint::new(start.0, start.1));
            assert!(m.on_drag_move(FramePoint::new(end.0, end.1)));
            let r = m.rect();
            assert_eq!(r.x, f64::min(start.0, end.0));
            assert_eq!(r.y, f64::min(start.1, end.1));
            assert_eq!(r.w, (end.0 - start.0).abs());
            assert_eq!(r.h, (end.1 - start.1).abs());
        }
    }

    #[test]
    fn rect_follows_latest_move_only() {
        let mut m = SelectionMachine::new(640, 480);
        m.on_drag_start(FramePoint::new(100.0, 100.0));
        for (x, y) in [(300.0, 10.0), (20.0, 400.0), (130.0, 150.0)] {
            m.on_drag_move(FramePoint::new(x, y));
        }
        assert_eq!(m.rect(), Rect::new(100.0, 100.0, 30.0, 50.0));
    }

    #[test]
    fn minimum_size_gate_is_exclusive() {
        let mut m = SelectionMachine::new(640, 480);
        drag(&mut m, (0.0, 0.0), (10.0, 40.0));
        assert!(!m.can_submit());
        assert_eq!(m.phase(), SelectionPhase::Idle);

        drag(&mut m, (0.0, 0.0), (40.0, 10.0));
        assert!(!m.can_submit());

        drag(&mut m, (0.0, 0.0), (11.0, 11.0));
        assert!(m.can_submit());
        assert_eq!(m.phase(), SelectionPhase::Ready);
    }

    #[test]
    fn points_are_clamped_to_frame() {
        let mut m = SelectionMachine::new(100, 80);
        m.on_drag_start(FramePoint::new(-30.0, 50.0));
        m.on_drag_move(FramePoint::new(250.0, -5.0));
        assert_eq!(m.rect(), Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut m = SelectionMachine::new(100, 100);
        assert!(!m.on_drag_move(FramePoint::new(50.0, 50.0)));
        assert_eq!(m.rect(), Rect::ZERO);

        drag(&mut m, (10.0, 10.0), (60.0, 60.0));
        let frozen = m.rect();
        assert!(!m.on_drag_move(FramePoint::new(90.0, 90.0)));
        assert_eq!(m.rect(), frozen);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut m = SelectionMachine::new(100, 100);
        drag(&mut m, (10.0, 10.0), (60.0, 60.0));
        m.reset(200, 150);
        assert_eq!(m.phase(), SelectionPhase::Idle);
        assert_eq!(m.rect(), Rect::ZERO);
        assert_eq!(m.bounds(), (200, 150));
    }
}
