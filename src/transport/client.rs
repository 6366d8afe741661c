//! HTTP client for the mileage service.
//!
//! One request per call, no retries: a failed upload is reported back
//! to the caller, who shows it and lets the user capture again.

use super::{ErrorBody, RecordView, TransportError, UploadPayload, UploadReceipt};

pub struct MileageClient {
    base_url: String,
    http: reqwest::Client,
}

impl MileageClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /upload-mileage`.
    ///
    /// A non-2xx answer becomes `TransportError::Rejected` carrying the
    /// service's own message.
    pub async fn upload(&self, payload: &UploadPayload) -> Result<UploadReceipt, TransportError> {
        let start = std::time::Instant::now();
        let url = format!("{}/upload-mileage", self.base_url);

        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = failure_message(response).await;
            log::warn!("[UPLOAD] Rejected with {}: {}", status, message);
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let receipt: UploadReceipt = response.json().await?;
        log::info!(
            "[UPLOAD] Mileage {} recorded in {}ms",
            receipt.mileage,
            start.elapsed().as_millis()
        );
        Ok(receipt)
    }

    /// `GET /records`, most recent first.
    pub async fn records(&self) -> Result<Vec<RecordView>, TransportError> {
        let url = format!("{}/records", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = failure_message(response).await;
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// The `message` field of an error body, or the raw text when the body
/// is not the expected shape.
async fn failure_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => format!("Service returned HTTP {}", status),
        Err(_) => body,
    }
}
