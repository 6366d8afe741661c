//! One capture cycle: acquire → snapshot → select → submit.
//!
//! The session is the only owner of the captured frame and the selection,
//! so there is no shared state to lock. Every method is called from the
//! same event dispatcher, one at a time.

use image::RgbaImage;

use super::{
    extract_region, CaptureError, CaptureSource, CapturedFrame, CropStrategy, RegionError,
};
use crate::overlay::Compositor;
use crate::selection::{
    map_to_frame, ClientPoint, DisplayBox, DragHandler, FramePoint, SelectionMachine,
    SelectionPhase,
};
use crate::transport::{self, TransportError, UploadPayload, UploadReceipt};

pub struct CaptureSession {
    strategy: CropStrategy,
    compositor: Compositor,
    frame: Option<CapturedFrame>,
    selection: SelectionMachine,
    ready: bool,
    status: String,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(CropStrategy::Manual)
    }
}

impl CaptureSession {
    pub fn new(strategy: CropStrategy) -> Self {
        Self {
            strategy,
            compositor: Compositor::default(),
            frame: None,
            selection: SelectionMachine::new(0, 0),
            ready: false,
            status: "Waiting for camera.".to_string(),
        }
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn strategy(&self) -> CropStrategy {
        self.strategy
    }

    /// Whether a snapshot can be taken right now.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Latest user-facing status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn frame(&self) -> Option<&CapturedFrame> {
        self.frame.as_ref()
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    /// Starts the source. Failure leaves the session not ready with the
    /// reason in the status line; it is never returned as an error.
    pub fn acquire(&mut self, source: &mut dyn CaptureSource) -> bool {
        match source.start() {
            Ok(()) => {
                self.ready = true;
                self.status = "Camera ready. Take a snapshot.".to_string();
                log::info!("[CAPTURE] Source '{}' ready", source.name());
            }
            Err(e) => {
                self.ready = false;
                self.status = format!("Cannot access the camera: {}", e);
                log::warn!("[CAPTURE] Source '{}' unavailable: {}", source.name(), e);
            }
        }
        self.ready
    }

    /// Grabs one frame, stops the source and starts a fresh selection.
    pub fn snapshot(&mut self, source: &mut dyn CaptureSource) -> Result<(), CaptureError> {
        if !self.ready {
            return Err(CaptureError::NotStarted);
        }

        let start = std::time::Instant::now();
        let frame = source.grab_frame()?;
        source.stop();
        self.ready = false;

        let (width, height) = frame.dimensions();
        self.selection.reset(width, height);
        self.frame = Some(frame);
        self.status = match self.strategy {
            CropStrategy::Manual => "Drag over the odometer digits to select them.".to_string(),
            CropStrategy::CenterFraction { .. } => "Snapshot taken. Submit to read it.".to_string(),
        };

        log::info!(
            "[CAPTURE] Snapshot {}x{} in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Throws away the frame and any selection, then restarts the source.
    pub fn retake(&mut self, source: &mut dyn CaptureSource) -> bool {
        self.discard();
        source.stop();
        self.acquire(source)
    }

    fn discard(&mut self) {
        self.frame = None;
        self.selection.reset(0, 0);
    }

    fn to_frame_space(&self, point: ClientPoint, display: DisplayBox) -> Option<FramePoint> {
        let frame = self.frame.as_ref()?;
        map_to_frame(point, display, frame.dimensions())
    }

    /// Pointer pressed on the displayed frame.
    pub fn pointer_down(&mut self, point: ClientPoint, display: DisplayBox) {
        if self.strategy != CropStrategy::Manual {
            return;
        }
        if let Some(p) = self.to_frame_space(point, display) {
            self.selection.on_drag_start(p);
        }
    }

    /// Pointer moved; returns `true` when the overlay needs a redraw.
    pub fn pointer_move(&mut self, point: ClientPoint, display: DisplayBox) -> bool {
        match self.to_frame_space(point, display) {
            Some(p) => self.selection.on_drag_move(p),
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        if self.frame.is_none() {
            return;
        }
        self.selection.on_drag_end();
        if self.selection.phase() == SelectionPhase::Ready {
            self.status = "Selection ready. Submit to read the mileage.".to_string();
        }
    }

    /// The frame with the selection overlay, or `None` before a snapshot.
    pub fn render(&self) -> Option<RgbaImage> {
        let frame = self.frame.as_ref()?;
        let rect = self
            .strategy
            .fixed_rect(frame.width(), frame.height())
            .unwrap_or_else(|| self.selection.rect());
        Some(self.compositor.compose(frame, rect))
    }

    pub fn can_submit(&self) -> bool {
        match self.strategy {
            CropStrategy::Manual => self.frame.is_some() && self.selection.can_submit(),
            CropStrategy::CenterFraction { .. } => self.frame.is_some(),
        }
    }

    /// Extracts and encodes the selected region.
    ///
    /// On success the frame and selection are dropped so the session is
    /// ready for the next capture cycle once the source is re-acquired.
    pub fn submit(&mut self) -> Result<UploadPayload, SubmitError> {
        let frame = self.frame.as_ref().ok_or(SubmitError::NoFrame)?;
        if !self.can_submit() {
            return Err(SubmitError::NotReady);
        }

        let rect = self
            .strategy
            .fixed_rect(frame.width(), frame.height())
            .unwrap_or_else(|| self.selection.rect());
        let region = extract_region(frame, rect)?;
        let payload = transport::encode_payload(&region)?;

        self.discard();
        self.status = "Processing image…".to_string();
        Ok(payload)
    }

    /// Records the upload outcome and restarts the source for the next
    /// capture, whatever the outcome was. The service's message is shown
    /// as-is; a source that cannot restart adds its reason after it.
    pub fn finish_upload(
        &mut self,
        source: &mut dyn CaptureSource,
        outcome: &Result<UploadReceipt, TransportError>,
    ) -> bool {
        let message = match outcome {
            Ok(receipt) => format!("{} Mileage: {}", receipt.message, receipt.mileage),
            Err(TransportError::Rejected { message, .. }) => message.clone(),
            Err(e) => format!("Upload failed: {}", e),
        };

        self.discard();
        let ready = self.acquire(source);
        self.status = if ready {
            message
        } else {
            format!("{} {}", message, self.status)
        };
        ready
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("No snapshot to submit, capture first")]
    NoFrame,

    #[error("Selection is not ready to submit")]
    NotReady,

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
