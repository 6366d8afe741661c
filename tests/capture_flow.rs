//! End-to-end capture cycle against an in-memory source: snapshot, drag on
//! a scaled canvas, redraw, submit, retake.

use image::{Rgba, RgbaImage};
use mileage_lens_lib::capture::{CaptureSession, StillSource};
use mileage_lens_lib::selection::{ClientPoint, DisplayBox, Rect, SelectionPhase};
use mileage_lens_lib::transport::decode_data_url;

const FRAME: (u32, u32) = (320, 240);

/// Frame with a bright "digit strip" so the crop content is recognisable.
fn odometer_frame() -> RgbaImage {
    RgbaImage::from_fn(FRAME.0, FRAME.1, |x, y| {
        if (100..220).contains(&x) && (100..140).contains(&y) {
            Rgba([250, 250, 250, 255])
        } else {
            Rgba([20, 20, 20, 255])
        }
    })
}

fn snapped_session() -> (CaptureSession, StillSource) {
    let mut session = CaptureSession::default();
    let mut source = StillSource::new(odometer_frame());
    assert!(session.acquire(&mut source));
    session.snapshot(&mut source).expect("snapshot");
    (session, source)
}

/// Canvas drawn at half its backing size, offset on the page.
fn half_scale_display() -> DisplayBox {
    DisplayBox::new(50.0, 80.0, FRAME.0 as f64 / 2.0, FRAME.1 as f64 / 2.0)
}

fn client_for(display: DisplayBox, frame_x: f64, frame_y: f64) -> ClientPoint {
    ClientPoint::new(
        display.left + frame_x * display.width / FRAME.0 as f64,
        display.top + frame_y * display.height / FRAME.1 as f64,
    )
}

#[test]
fn drag_on_scaled_canvas_selects_frame_pixels() {
    let (mut session, _source) = snapped_session();
    let display = half_scale_display();

    session.pointer_down(client_for(display, 220.0, 140.0), display);
    assert!(session.pointer_move(client_for(display, 100.0, 100.0), display));
    session.pointer_up();

    assert_eq!(session.selection().phase(), SelectionPhase::Ready);
    assert_eq!(session.selection().rect(), Rect::new(100.0, 100.0, 120.0, 40.0));
    assert!(session.can_submit());
}

#[test]
fn redraw_during_drag_is_stable() {
    let (mut session, _source) = snapped_session();
    let display = DisplayBox::new(0.0, 0.0, FRAME.0 as f64, FRAME.1 as f64);

    session.pointer_down(ClientPoint::new(10.0, 10.0), display);
    session.pointer_move(ClientPoint::new(90.0, 70.0), display);

    let first = session.render().expect("frame present");
    let second = session.render().expect("frame present");
    assert_eq!(first, second);

    // Moving back to an earlier rectangle draws exactly what was drawn then.
    session.pointer_move(ClientPoint::new(200.0, 200.0), display);
    session.pointer_move(ClientPoint::new(90.0, 70.0), display);
    assert_eq!(session.render().expect("frame present"), first);
}

#[test]
fn submit_uploads_exactly_the_selection() {
    let (mut session, _source) = snapped_session();
    let display = DisplayBox::new(0.0, 0.0, FRAME.0 as f64, FRAME.1 as f64);

    session.pointer_down(ClientPoint::new(100.0, 100.0), display);
    session.pointer_move(ClientPoint::new(220.0, 140.0), display);
    session.pointer_up();

    let payload = session.submit().expect("submit");
    assert!(payload.image.starts_with("data:image/jpeg;base64,"));

    let bytes = decode_data_url(&payload.image).unwrap();
    let crop = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(crop.dimensions(), (120, 40));

    // JPEG is lossy; the centre of the strip must still be bright.
    let centre = crop.get_pixel(60, 20);
    assert!(centre.0.iter().all(|&c| c > 200), "centre was {:?}", centre);

    // Back to a capturable state.
    assert!(session.frame().is_none());
    assert!(!session.can_submit());
}

#[test]
fn small_drag_never_enables_submit() {
    let (mut session, _source) = snapped_session();
    let display = DisplayBox::new(0.0, 0.0, FRAME.0 as f64, FRAME.1 as f64);

    session.pointer_down(ClientPoint::new(50.0, 50.0), display);
    session.pointer_move(ClientPoint::new(60.0, 150.0), display);
    session.pointer_up();

    assert_eq!(session.selection().rect().w, 10.0);
    assert!(!session.can_submit());
    assert!(session.submit().is_err());
}

#[test]
fn drag_past_canvas_edge_is_clamped() {
    let (mut session, _source) = snapped_session();
    let display = DisplayBox::new(0.0, 0.0, FRAME.0 as f64, FRAME.1 as f64);

    session.pointer_down(ClientPoint::new(300.0, 200.0), display);
    session.pointer_move(ClientPoint::new(900.0, 900.0), display);
    session.pointer_up();

    assert_eq!(session.selection().rect(), Rect::new(300.0, 200.0, 20.0, 40.0));

    let payload = session.submit().expect("submit");
    let bytes = decode_data_url(&payload.image).unwrap();
    let crop = image::load_from_memory(&bytes).unwrap();
    assert_eq!((crop.width(), crop.height()), (20, 40));
}

#[test]
fn retake_resets_selection_to_idle() {
    let (mut session, mut source) = snapped_session();
    let display = DisplayBox::new(0.0, 0.0, FRAME.0 as f64, FRAME.1 as f64);

    session.pointer_down(ClientPoint::new(10.0, 10.0), display);
    session.pointer_move(ClientPoint::new(100.0, 100.0), display);

    assert!(session.retake(&mut source));
    assert_eq!(session.selection().phase(), SelectionPhase::Idle);
    assert!(!session.selection().rect().has_area());

    session.snapshot(&mut source).expect("second snapshot");
    assert_eq!(session.selection().rect(), Rect::ZERO);
    assert_eq!(session.render().expect("frame"), odometer_frame());
}
