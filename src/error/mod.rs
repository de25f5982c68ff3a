// Error types for content-sentry
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message returned when the request carries no usable file.
pub const NO_FILE_MESSAGE: &str = "No image file found in the request.";

/// Message returned when the file extension is not an accepted image type.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a valid image file (JPEG, PNG, or GIF).";

/// Prefix prepended to every 500 response body.
pub const SERVER_ERROR_PREFIX: &str = "An error occurred: ";

#[derive(Error, Debug)]
pub enum DetectorError {
    /// Caller-supplied input was rejected before reaching Rekognition.
    #[error("{0}")]
    Validation(String),

    /// The remote moderation call failed (transport, auth, quota, bad response).
    #[error("{0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DetectorError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `Error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            DetectorError::Validation(msg) => msg.clone(),
            other => format!("{}{}", SERVER_ERROR_PREFIX, other),
        }
    }
}

// Convert DetectorError to HTTP responses for Axum
impl IntoResponse for DetectorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "Error": self.public_message() });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
