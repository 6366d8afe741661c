//! Transport — turns an extracted region into the upload body, and the
//! JSON shapes both ends of the upload agree on.

pub mod client;

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbaImage};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use client::MileageClient;

/// JPEG quality used for uploads (0.9 on a 0–1 scale).
pub const JPEG_QUALITY: u8 = 90;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

static DATA_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/\w+;base64,").unwrap());

/// Body of `POST /upload-mileage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    /// `data:image/jpeg;base64,<payload>`
    pub image: String,
}

/// Success body of `POST /upload-mileage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    /// Recognised digits exactly as read, e.g. `"123456.7"`.
    pub mileage: String,
    pub timestamp: DateTime<Utc>,
}

/// One entry of `GET /records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub mileage: f64,
    pub timestamp: DateTime<Utc>,
}

/// Failure body shared by both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        rename = "rawOcrText",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_ocr_text: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
            raw_ocr_text: None,
        }
    }
}

/// Encodes a region as JPEG. Alpha is dropped; JPEG has no channel for it.
pub fn encode_jpeg(region: &RgbaImage, quality: u8) -> Result<Vec<u8>, TransportError> {
    let rgb = DynamicImage::ImageRgba8(region.clone()).to_rgb8();

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| TransportError::Encode(e.to_string()))?;

    Ok(jpeg_bytes)
}

pub fn to_data_url(jpeg_bytes: &[u8]) -> String {
    format!("{}{}", JPEG_DATA_URL_PREFIX, STANDARD.encode(jpeg_bytes))
}

/// Region → JPEG → base64 data URL → upload body.
pub fn encode_payload(region: &RgbaImage) -> Result<UploadPayload, TransportError> {
    let start = std::time::Instant::now();
    let jpeg_bytes = encode_jpeg(region, JPEG_QUALITY)?;
    let image = to_data_url(&jpeg_bytes);

    log::info!(
        "[UPLOAD] Encoded {}x{} region in {}ms ({} JPEG bytes)",
        region.width(),
        region.height(),
        start.elapsed().as_millis(),
        jpeg_bytes.len()
    );

    Ok(UploadPayload { image })
}

/// Strips a `data:image/<type>;base64,` prefix if present and decodes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, TransportError> {
    let payload = DATA_URL_PREFIX.replace(data_url.trim(), "");
    STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| TransportError::Decode(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    #[error("Image payload is not valid base64: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a failure; `message` is its own wording.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn payload_is_jpeg_data_url() {
        let region = RgbaImage::from_pixel(32, 16, Rgba([10, 200, 30, 255]));
        let payload = encode_payload(&region).unwrap();
        assert!(payload.image.starts_with(JPEG_DATA_URL_PREFIX));

        let bytes = decode_data_url(&payload.image).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn decode_accepts_other_image_types_and_bare_base64() {
        let raw = b"not really a png";
        let encoded = STANDARD.encode(raw);
        assert_eq!(
            decode_data_url(&format!("data:image/png;base64,{}", encoded)).unwrap(),
            raw
        );
        assert_eq!(decode_data_url(&encoded).unwrap(), raw);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_data_url("data:image/jpeg;base64,@@@@").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn error_body_uses_wire_names() {
        let body = ErrorBody {
            message: "no digits".into(),
            error: None,
            raw_ocr_text: Some("ODO".into()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["rawOcrText"], "ODO");
        assert!(json.get("error").is_none());
    }
}
