use image::{DynamicImage, RgbaImage};

use super::CaptureError;

/// One snapshotted frame. Never modified after capture; a retake
/// replaces it wholesale.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    image: RgbaImage,
}

impl CapturedFrame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    /// Wrap a raw RGBA byte buffer, checking it matches `width x height x 4`.
    pub fn from_raw(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        let len = rgba.len();
        RgbaImage::from_raw(width, height, rgba)
            .map(Self::new)
            .ok_or(CaptureError::InvalidFrame {
                width,
                height,
                len,
            })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
