//! Frame sources, the infrastructure side of capture.
//!
//! A live camera, a file on disk and a frame held in memory all look the
//! same to the session: start, grab one frame, stop. A source that cannot
//! start is reported, never panicked on.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use super::CapturedFrame;

/// Anything that can hand over a frame on demand.
pub trait CaptureSource {
    /// Human-readable name for logs and status lines.
    fn name(&self) -> &str;

    /// Acquire the underlying device or file. Called before `grab_frame`.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Snapshot the current frame.
    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// Release the device. Safe to call when not started.
    fn stop(&mut self);
}

/// Reads a still photo from disk, decoded once on `start`.
pub struct ImageFileSource {
    path: PathBuf,
    name: String,
    decoded: Option<DynamicImage>,
}

impl ImageFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self {
            path,
            name,
            decoded: None,
        }
    }
}

impl CaptureSource for ImageFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        let start = std::time::Instant::now();
        let image = image::open(&self.path).map_err(|e| match e {
            image::ImageError::IoError(io) => {
                CaptureError::Unavailable(format!("{}: {}", self.name, io))
            }
            other => CaptureError::Decode(other.to_string()),
        })?;

        log::info!(
            "[CAPTURE] Opened {} ({}x{}) in {}ms",
            self.name,
            image.width(),
            image.height(),
            start.elapsed().as_millis()
        );
        self.decoded = Some(image);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
        let image = self.decoded.as_ref().ok_or(CaptureError::NotStarted)?;
        Ok(CapturedFrame::from_dynamic(image.clone()))
    }

    fn stop(&mut self) {
        self.decoded = None;
    }
}

/// Serves a frame held in memory, or refuses to start with a fixed reason.
///
/// Useful for embedding the session where frames arrive by other means,
/// and for exercising the unavailable path.
pub struct StillSource {
    frame: Result<RgbaImage, String>,
    running: bool,
}

impl StillSource {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            frame: Ok(image),
            running: false,
        }
    }

    /// A source that always fails to start, as a camera does without permission.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            frame: Err(reason.into()),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl CaptureSource for StillSource {
    fn name(&self) -> &str {
        "still"
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        match &self.frame {
            Ok(_) => {
                self.running = true;
                Ok(())
            }
            Err(reason) => Err(CaptureError::Unavailable(reason.clone())),
        }
    }

    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
        if !self.running {
            return Err(CaptureError::NotStarted);
        }
        match &self.frame {
            Ok(image) => Ok(CapturedFrame::new(image.clone())),
            Err(reason) => Err(CaptureError::Unavailable(reason.clone())),
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture source unavailable: {0}")]
    Unavailable(String),

    #[error("Capture source has not been started")]
    NotStarted,

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Frame buffer of {len} bytes does not fit {width}x{height} RGBA")]
    InvalidFrame { width: u32, height: u32, len: usize },
}
