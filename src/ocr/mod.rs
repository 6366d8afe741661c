//! Text recognition, delegated to an external engine.
//!
//! The service only needs "image bytes in, text out" plus the mileage
//! parser that turns that text into a number.

pub mod mileage;
mod tesseract;

pub use mileage::{parse_mileage, Mileage};
pub use tesseract::TesseractEngine;

/// Result of one recognition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub char_count: usize,
    pub latency_ms: f64,
}

impl OcrOutput {
    pub fn new(text: String, latency_ms: f64) -> Self {
        let char_count = text.chars().count();
        Self {
            text,
            char_count,
            latency_ms,
        }
    }
}

/// Anything that can read text from an encoded image.
///
/// Implementations block; async callers run them on a blocking thread.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrOutput, OcrError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine '{0}' is not installed or not on PATH")]
    Unavailable(String),

    #[error("OCR engine failed: {0}")]
    Failed(String),

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}
