use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{info, warn};

use ecoaware_core::{AnalysisResult, SegregationReport};
use ecoaware_inference::InferenceBackend;
use logging::{InferenceEvent, RequestLog};

use crate::upload::{read_upload, sniff_image_format, UploadForm, UploadedImage};

const NO_IMAGE: &str = "No image file provided";
const NO_FILE_SELECTED: &str = "No file selected";
const INVALID_IMAGE: &str = "Invalid image file";
const NO_MESSAGE: &str = "No message provided";
const INVALID_CHAT_BODY: &str = "Request body must be a JSON object";

/// Shared application state for API handlers.
pub struct AppState {
    pub backend: InferenceBackend,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: InferenceBackend) -> Self {
        Self {
            backend,
            started_at: Utc::now(),
        }
    }
}

/// Request-level failure rendered as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Upload exceeds the maximum allowed size")]
    PayloadTooLarge,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn bad(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ai/analyze-image", post(analyze_image))
        .route("/ai/check-segregation", post(check_segregation))
        .route("/ai/chat", post(chat))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CatchPanicLayer::custom(|_: Box<dyn Any + Send + 'static>| {
            ApiError::Internal("Internal server error".into()).into_response()
        }))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "EcoAware AI Backend",
        "mode": state.backend.mode,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": (Utc::now() - state.started_at).num_seconds().max(0),
        "timestamp": Utc::now(),
    }))
}

/// Sustainability analysis of an uploaded product image.
async fn analyze_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad(NO_IMAGE))?;
    let form = read_upload(multipart).await?;
    analyze_upload(&state, form).await.map(Json)
}

pub(crate) async fn analyze_upload(
    state: &AppState,
    form: UploadForm,
) -> Result<AnalysisResult, ApiError> {
    let user_id = form.field_or("userId", "anonymous");
    let image = form.image.ok_or_else(|| ApiError::bad(NO_IMAGE))?;
    if image.filename.is_empty() {
        return Err(ApiError::bad(NO_FILE_SELECTED));
    }
    validate_image(&image)?;

    info!(filename = %image.filename, user_id = %user_id, "Processing image");
    let result = state
        .backend
        .classifier
        .classify(&image.filename, Some(&image.data[..]))
        .await;

    RequestLog::record(
        &uuid::Uuid::new_v4().to_string(),
        InferenceEvent::Analysis {
            filename: image.filename,
            user_id,
            method: method_tag(&result.analysis_method),
            alert: result.alert,
        },
    );
    Ok(result)
}

/// Segregation check of an uploaded waste photo (worker feature).
async fn check_segregation(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SegregationReport>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad(NO_IMAGE))?;
    let form = read_upload(multipart).await?;
    segregation_upload(&state, form).await.map(Json)
}

pub(crate) async fn segregation_upload(
    state: &AppState,
    form: UploadForm,
) -> Result<SegregationReport, ApiError> {
    let worker_id = form.field_or("workerId", "anonymous");
    let image = form.image.ok_or_else(|| ApiError::bad(NO_IMAGE))?;
    validate_image(&image)?;

    info!(filename = %image.filename, worker_id = %worker_id, "Checking segregation");
    let report = state
        .backend
        .segregation
        .check(&image.filename, Some(&image.data[..]))
        .await;

    RequestLog::record(
        &uuid::Uuid::new_v4().to_string(),
        InferenceEvent::Segregation {
            filename: image.filename,
            worker_id,
            method: method_tag(&report.analysis_method()),
        },
    );
    Ok(report)
}

fn validate_image(image: &UploadedImage) -> Result<(), ApiError> {
    match sniff_image_format(&image.data) {
        Some(_) => Ok(()),
        None => {
            warn!(filename = %image.filename, size = image.data.len(), "Rejected non-image upload");
            Err(ApiError::bad(INVALID_IMAGE))
        }
    }
}

fn method_tag<T: Serialize>(method: &T) -> String {
    serde_json::to_value(method)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "anonymous", rename = "userId")]
    pub user_id: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn anonymous() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub language: String,
}

/// Eco-advice chat endpoint.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e.body_text(), "Rejected chat request body");
        ApiError::bad(INVALID_CHAT_BODY)
    })?;
    chat_reply(&state, request).await.map(Json)
}

pub(crate) async fn chat_reply(
    state: &AppState,
    request: ChatRequest,
) -> Result<ChatResponse, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad(NO_MESSAGE));
    }

    let response = state.backend.assistant.reply(message, &request.language).await;

    RequestLog::record(
        &uuid::Uuid::new_v4().to_string(),
        InferenceEvent::Chat {
            user_id: request.user_id.clone(),
            language: request.language.clone(),
            preview: message.to_string(),
        },
    );
    Ok(ChatResponse {
        response,
        language: request.language,
    })
}
