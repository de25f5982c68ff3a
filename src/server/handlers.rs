// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::{AppState, ANALYZE_IMAGE_PATH};
use crate::error::{DetectorError, Result, NO_FILE_MESSAGE};
use crate::metrics;
use crate::moderation::{ModerationResult, UploadedImage};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Multipart field carrying the upload (matched case-insensitively)
pub const IMAGE_FIELD: &str = "imageFile";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub region: String,
    pub endpoint: String,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        region: state.config.rekognition.region.clone(),
        endpoint: state.config.rekognition.endpoint_url(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Handler for `POST /api/content` (analyze-image)
///
/// Every outcome is JSON: `{"Probability": f}` on success, `{"Error": msg}`
/// with 400 or 500 otherwise.
pub async fn analyze_image_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();

    let response = match analyze_image(&state, multipart).await {
        Ok(result) => {
            info!("Image analyzed, probability={}", result.probability);
            Json(result).into_response()
        }
        Err(DetectorError::Validation(message)) => {
            let reason = if message == NO_FILE_MESSAGE { "no_file" } else { "unsupported_type" };
            metrics::record_validation_rejection(reason);
            warn!("Rejected upload: {}", message);
            DetectorError::Validation(message).into_response()
        }
        Err(e) => {
            error!("Image analysis failed: {}", e);
            e.into_response()
        }
    };

    metrics::record_request(
        "POST",
        ANALYZE_IMAGE_PATH,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

async fn analyze_image(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ModerationResult> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("Request body is not multipart: {}", rejection);
            return Err(DetectorError::Validation(NO_FILE_MESSAGE.to_string()));
        }
    };

    let image = read_image_field(multipart)
        .await?
        .ok_or_else(|| DetectorError::Validation(NO_FILE_MESSAGE.to_string()))?;

    state.adapter.submit_image(image).await
}

/// Read the first file field named [`IMAGE_FIELD`] fully into memory.
///
/// Fields with another name, or without a file name, are skipped.
async fn read_image_field(mut multipart: Multipart) -> Result<Option<UploadedImage>> {
    while let Some(field) = multipart.next_field().await? {
        let is_image_field = field
            .name()
            .map(|name| name.eq_ignore_ascii_case(IMAGE_FIELD))
            .unwrap_or(false);
        if !is_image_field {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!("Field {} has no file name, skipping", IMAGE_FIELD);
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        debug!("Received {} ({} bytes, {:?})", file_name, bytes.len(), content_type);

        return Ok(Some(UploadedImage::new(file_name, bytes)));
    }

    Ok(None)
}
