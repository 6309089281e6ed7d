//! Multipart image uploads.
//!
//! Collects the `image` file part and plain form fields, and recognises
//! image payloads by their leading magic bytes.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::{debug, warn};

use crate::api::ApiError;

/// Form field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Bytes,
}

/// A parsed multipart form.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub image: Option<UploadedImage>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Text field value, or `default` when absent or blank.
    pub fn field_or(&self, name: &str, default: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

/// Drain a multipart body into an [`UploadForm`].
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read upload", e))?;
            debug!(filename = %filename, size = data.len(), "Received image part");
            form.image = Some(UploadedImage { filename, data });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(&format!("Failed to read field '{name}'"), e))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Body-limit overruns surface as 413; anything else is a malformed request.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %e, "Upload exceeded body limit");
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("{context}: {e}"))
    }
}

/// Detect an image format from its leading bytes.
pub fn sniff_image_format(data: &[u8]) -> Option<&'static str> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    }
}
