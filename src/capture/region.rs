//! Pure region extraction logic — functional core.
//!
//! This module has zero infrastructure dependencies.
//! It takes pixel data in, returns pixel data out.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use super::CapturedFrame;
use crate::selection::Rect;

/// Integer source rectangle, already clipped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rounds a frame-space rectangle to whole pixels and intersects it with
/// a `frame_width x frame_height` frame.
///
/// The origin rounds to the nearest pixel and the size to `round(w) x
/// round(h)`. Returns `None` when nothing of the rectangle is on the frame.
pub fn clip_to_frame(rect: Rect, frame_width: u32, frame_height: u32) -> Option<PixelRegion> {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = x0 + rect.w.round() as i64;
    let y1 = y0 + rect.h.round() as i64;

    let left = x0.max(0);
    let top = y0.max(0);
    let right = x1.min(frame_width as i64);
    let bottom = y1.min(frame_height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(PixelRegion {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Copies the selected region of a frame into a new, tightly sized buffer.
///
/// Parts of the rectangle that fall outside the frame are clipped away
/// silently; the output is sized to what remains. Nothing outside the
/// frame's pixels is ever read.
pub fn extract_region(frame: &CapturedFrame, rect: Rect) -> Result<RgbaImage, RegionError> {
    let (frame_width, frame_height) = frame.dimensions();
    let region = clip_to_frame(rect, frame_width, frame_height).ok_or(RegionError::Empty {
        rect,
        frame_size: (frame_width, frame_height),
    })?;

    let cropped = imageops::crop_imm(
        frame.image(),
        region.x,
        region.y,
        region.width,
        region.height,
    )
    .to_image();

    log::debug!(
        "[CAPTURE] Extracted {}x{} at {},{} from {}x{} frame",
        region.width,
        region.height,
        region.x,
        region.y,
        frame_width,
        frame_height
    );

    Ok(cropped)
}

/// How the submitted rectangle is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CropStrategy {
    /// The rectangle the user dragged out.
    #[default]
    Manual,
    /// A fixed rectangle centred on the frame, sized as a fraction of it.
    CenterFraction { width_frac: f64, height_frac: f64 },
}

impl CropStrategy {
    /// Wide, short window matching a typical odometer readout.
    pub fn center_default() -> Self {
        CropStrategy::CenterFraction {
            width_frac: 0.6,
            height_frac: 0.3,
        }
    }

    /// The centred rectangle for a frame, or `None` for manual selection.
    pub fn fixed_rect(&self, frame_width: u32, frame_height: u32) -> Option<Rect> {
        match *self {
            CropStrategy::Manual => None,
            CropStrategy::CenterFraction {
                width_frac,
                height_frac,
            } => {
                let w = frame_width as f64 * width_frac.clamp(0.0, 1.0);
                let h = frame_height as f64 * height_frac.clamp(0.0, 1.0);
                let x = (frame_width as f64 - w) / 2.0;
                let y = (frame_height as f64 - h) / 2.0;
                Some(Rect::new(x, y, w, h))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error(
        "Selection {rect} does not overlap the {}x{} frame",
        frame_size.0, frame_size.1
    )]
    Empty { rect: Rect, frame_size: (u32, u32) },
}
