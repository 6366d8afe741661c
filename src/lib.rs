//! Mileage Lens — snapshot an odometer, crop the digits, log the reading.
//!
//! Two halves share this crate:
//! - The capture core (capture/, selection/, overlay.rs, transport/):
//!   snapshot a frame, drag out the reading, extract and encode it.
//! - The service (server.rs, ocr/, store.rs): receive the crop, OCR it,
//!   store the mileage, list recent readings.

pub mod capture;
pub mod config;
pub mod ocr;
pub mod overlay;
pub mod selection;
pub mod server;
pub mod store;
pub mod transport;
