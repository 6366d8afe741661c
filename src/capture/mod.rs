//! Capture domain — public API.
//!
//! This module owns the frame snapshot, the region extraction and the
//! session object that ties a frame to its selection. External code
//! should only use the items exported here.

mod frame;
mod region;
mod session;
mod source;

pub use frame::CapturedFrame;
pub use region::{clip_to_frame, extract_region, CropStrategy, PixelRegion, RegionError};
pub use session::{CaptureSession, SubmitError};
pub use source::{CaptureError, CaptureSource, ImageFileSource, StillSource};
