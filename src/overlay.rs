//! Selection overlay: dims the frame around the selected rectangle.
//!
//! Every call starts again from the untouched frame, so drawing the same
//! selection twice gives byte-identical output.

use image::{Rgba, RgbaImage};

use crate::capture::{clip_to_frame, CapturedFrame};
use crate::selection::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorStyle {
    /// Colour painted over everything outside the selection. Its alpha
    /// is the blend strength.
    pub dim: Rgba<u8>,
    pub border: Rgba<u8>,
    pub border_width: u32,
}

impl Default for CompositorStyle {
    fn default() -> Self {
        Self {
            dim: Rgba([0, 0, 0, 128]),
            border: Rgba([0xFF, 0xC1, 0x07, 0xFF]),
            border_width: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Compositor {
    style: CompositorStyle,
}

impl Compositor {
    pub fn new(style: CompositorStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &CompositorStyle {
        &self.style
    }

    /// Frame, then dim layer, then the cut-out window, then the border.
    ///
    /// A selection that covers no whole pixel once rounded, the same test
    /// extraction applies, leaves the frame unchanged.
    pub fn compose(&self, frame: &CapturedFrame, selection: Rect) -> RgbaImage {
        let mut out = frame.image().clone();

        let (width, height) = frame.dimensions();
        let Some(window) = clip_to_frame(selection, width, height) else {
            return out;
        };

        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let inside = x >= window.x
                && x < window.x + window.width
                && y >= window.y
                && y < window.y + window.height;
            if !inside {
                *pixel = blend(*pixel, self.style.dim);
            }
        }

        self.stroke(&mut out, selection);
        out
    }

    /// Border centred on the rectangle edges, clipped to the image.
    fn stroke(&self, out: &mut RgbaImage, selection: Rect) {
        let line = self.style.border_width as i64;
        if line == 0 {
            return;
        }
        let outer = line / 2;
        let inner = line - outer;

        let x0 = selection.x.round() as i64;
        let y0 = selection.y.round() as i64;
        let x1 = x0 + selection.w.round() as i64;
        let y1 = y0 + selection.h.round() as i64;

        let (width, height) = (out.width() as i64, out.height() as i64);
        let top = (y0 - outer).max(0);
        let bottom = (y1 + outer).min(height);
        let left = (x0 - outer).max(0);
        let right = (x1 + outer).min(width);

        for y in top..bottom {
            for x in left..right {
                let interior =
                    x >= x0 + inner && x < x1 - inner && y >= y0 + inner && y < y1 - inner;
                if !interior {
                    out.put_pixel(x as u32, y as u32, self.style.border);
                }
            }
        }
    }
}

/// Source-over blend of `top` onto `base`.
fn blend(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let a = top[3] as u32;
    let keep = 255 - a;
    let mix = |b: u8, t: u8| ((t as u32 * a + b as u32 * keep + 127) / 255) as u8;
    let alpha = (a + (base[3] as u32 * keep + 127) / 255).min(255) as u8;
    Rgba([
        mix(base[0], top[0]),
        mix(base[1], top[1]),
        mix(base[2], top[2]),
        alpha,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_frame(width: u32, height: u32) -> CapturedFrame {
        CapturedFrame::new(RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255])))
    }

    #[test]
    fn empty_selection_returns_frame_unchanged() {
        let frame = grey_frame(40, 30);
        let out = Compositor::default().compose(&frame, Rect::new(5.0, 5.0, 0.0, 10.0));
        assert_eq!(&out, frame.image());
    }

    #[test]
    fn sub_pixel_selection_draws_nothing() {
        let frame = grey_frame(40, 30);
        let compositor = Compositor::default();
        assert_eq!(&compositor.compose(&frame, Rect::new(5.0, 5.0, 0.4, 10.0)), frame.image());
        assert_eq!(&compositor.compose(&frame, Rect::new(5.0, 5.0, 10.0, 0.3)), frame.image());
    }

    #[test]
    fn redraw_is_idempotent() {
        let frame = CapturedFrame::new(RgbaImage::from_fn(80, 60, |x, y| {
            Rgba([(x * 3) as u8, (y * 4) as u8, 90, 255])
        }));
        let compositor = Compositor::default();
        let rect = Rect::new(10.3, 12.0, 40.0, 25.6);

        let first = compositor.compose(&frame, rect);
        let second = compositor.compose(&frame, rect);
        assert_eq!(first, second);
    }

    #[test]
    fn outside_is_dimmed_and_window_keeps_original_pixels() {
        let frame = grey_frame(100, 100);
        let out = Compositor::default().compose(&frame, Rect::new(20.0, 20.0, 40.0, 40.0));

        assert_eq!(*out.get_pixel(5, 5), Rgba([100, 100, 100, 255]));
        assert_eq!(*out.get_pixel(40, 40), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn border_straddles_the_edge() {
        let frame = grey_frame(100, 100);
        let style = CompositorStyle::default();
        let out = Compositor::new(style).compose(&frame, Rect::new(20.0, 20.0, 40.0, 40.0));

        // 2px line: one pixel outside the edge, one inside.
        assert_eq!(*out.get_pixel(19, 40), style.border);
        assert_eq!(*out.get_pixel(20, 40), style.border);
        assert_ne!(*out.get_pixel(21, 40), style.border);
        assert_ne!(*out.get_pixel(18, 40), style.border);
        assert_eq!(*out.get_pixel(59, 30), style.border);
        assert_eq!(*out.get_pixel(60, 30), style.border);
    }

    #[test]
    fn border_at_frame_edge_is_clipped() {
        let frame = grey_frame(50, 50);
        let out = Compositor::default().compose(&frame, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(*out.get_pixel(0, 0), CompositorStyle::default().border);
        assert_eq!(*out.get_pixel(25, 25), Rgba([200, 200, 200, 255]));
    }
}
