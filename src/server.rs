//! Mileage HTTP service.
//!
//! ## Endpoints
//!
//! ```text
//! POST /upload-mileage   { "image": "data:image/jpeg;base64,..." }
//!   200 { "message", "mileage", "timestamp" }
//!   400 { "message" }                 missing or undecodable image, body not JSON
//!   413 { "message" }                 body over the configured limit
//!   400 { "message", "rawOcrText" }   no mileage in the OCR text
//!   500 { "message", "error" }        OCR or database failure
//!
//! GET /records
//!   200 [ { "mileage", "timestamp" }, ... ]   newest first
//! ```

use std::sync::{Arc, Mutex};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::Settings;
use crate::ocr::{parse_mileage, OcrEngine, TesseractEngine};
use crate::store::{RecordStore, StoreError};
use crate::transport::{decode_data_url, ErrorBody, RecordView, UploadReceipt};

/// Shared handler state. Cloned per request; the store is locked only
/// for the span of one statement.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<RecordStore>>,
    ocr: Arc<dyn OcrEngine>,
    records_limit: usize,
}

impl AppState {
    pub fn new(store: RecordStore, ocr: Arc<dyn OcrEngine>, records_limit: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            ocr,
            records_limit,
        }
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&RecordStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self.store.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }
}

#[derive(Debug, Deserialize)]
struct UploadRequest {
    image: Option<String>,
}

/// An error response: status plus the JSON failure body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new(message),
        }
    }

    fn internal(message: &str, error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                message: message.to_string(),
                error: Some(error.to_string()),
                raw_ocr_text: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/upload-mileage", post(upload_mileage))
        .route("/records", get(list_records))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log::warn!("[SERVER] Rejected upload body: {}", rejection.body_text());
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                body: ErrorBody::new("Image is too large."),
            },
            _ => Self::bad_request("Missing image data."),
        }
    }
}

async fn upload_mileage(
    State(state): State<AppState>,
    request: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadReceipt>, ApiError> {
    let Json(request) = request?;
    let image = request
        .image
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing image data."))?;

    let image_bytes = decode_data_url(&image).map_err(|e| {
        log::warn!("[SERVER] Rejected upload: {}", e);
        ApiError::bad_request("Image data could not be decoded.")
    })?;

    let ocr = Arc::clone(&state.ocr);
    let output = tokio::task::spawn_blocking(move || ocr.recognize(&image_bytes))
        .await
        .map_err(|e| ApiError::internal("Server processing error", e))?
        .map_err(|e| {
            log::error!("[OCR] Recognition failed: {}", e);
            ApiError::internal("Server processing error", e)
        })?;

    log::info!("[OCR] Raw text: {:?}", output.text.trim());

    let Some(mileage) = parse_mileage(&output.text) else {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                message: "Could not read a mileage from the image. Make sure the digits are sharp."
                    .to_string(),
                error: None,
                raw_ocr_text: Some(output.text),
            },
        });
    };

    let record = state
        .with_store(|store| store.insert(mileage.value, Utc::now()))
        .map_err(|e| {
            log::error!("[STORE] Insert failed: {}", e);
            ApiError::internal("Server processing error", e)
        })?;

    log::info!("[SERVER] Mileage {} recorded as id {}", mileage.digits, record.id);

    Ok(Json(UploadReceipt {
        message: "Mileage recorded.".to_string(),
        mileage: mileage.digits,
        timestamp: record.timestamp,
    }))
}

async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<RecordView>>, ApiError> {
    let records = state
        .with_store(|store| store.recent(state.records_limit))
        .map_err(|e| {
            log::error!("[STORE] Query failed: {}", e);
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorBody::new("Failed to query records."),
            }
        })?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| RecordView {
                mileage: r.mileage,
                timestamp: r.timestamp,
            })
            .collect(),
    ))
}

/// Serves `router` on an already-bound listener until it fails.
pub async fn serve_with(listener: TcpListener, router: Router) -> Result<(), ServerError> {
    axum::serve(listener, router).await?;
    Ok(())
}

/// Opens the store, checks the OCR engine and serves until Ctrl-C.
///
/// An unreachable store is fatal: the error is returned before binding.
pub async fn serve(settings: &Settings) -> Result<(), ServerError> {
    let store = RecordStore::open(&settings.db_path)?;

    let ocr = TesseractEngine::new(&settings.ocr_command, &settings.ocr_lang);
    ocr.warm_up();

    let state = AppState::new(store, Arc::new(ocr), settings.records_limit);
    let app = router(state, settings.body_limit);

    let listener = TcpListener::bind(&settings.bind).await?;
    log::info!("[SERVER] Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("[SERVER] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("[SERVER] Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
