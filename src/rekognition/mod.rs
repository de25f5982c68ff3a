// Amazon Rekognition API client module
// Author: kelexine (https://github.com/kelexine)

mod client;
pub mod signing;

pub use client::RekognitionClient;

use crate::config::RekognitionConfig;
use crate::error::{DetectorError, Result};
use crate::moderation::ModerationLabel;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// `X-Amz-Target` value for the moderation call
pub const DETECT_MODERATION_LABELS_TARGET: &str = "RekognitionService.DetectModerationLabels";

/// Content type of the Rekognition JSON protocol
pub const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Service name used in the SigV4 credential scope
pub const SIGNING_SERVICE: &str = "rekognition";

/// AWS credentials used to sign requests
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

// Custom Debug impl that never logs secrets
impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsCredentials {
    /// Resolve credentials from configuration, falling back to the standard
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN` variables.
    pub fn resolve(config: &RekognitionConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Same as [`AwsCredentials::resolve`] with an injectable variable lookup.
    pub fn resolve_with<F>(config: &RekognitionConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: &String| !value.trim().is_empty();
        let pick = |configured: &Option<String>, var: &str| {
            configured
                .clone()
                .filter(non_empty)
                .or_else(|| lookup(var).filter(non_empty))
        };

        let access_key_id = pick(&config.access_key_id, "AWS_ACCESS_KEY_ID").ok_or_else(|| {
            DetectorError::Config(
                "No AWS access key id configured (rekognition.access_key_id or AWS_ACCESS_KEY_ID)"
                    .to_string(),
            )
        })?;

        let secret_access_key =
            pick(&config.secret_access_key, "AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
                DetectorError::Config(
                    "No AWS secret access key configured (rekognition.secret_access_key or AWS_SECRET_ACCESS_KEY)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: pick(&config.session_token, "AWS_SESSION_TOKEN"),
        })
    }
}

/// Request body for `DetectModerationLabels`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectModerationLabelsRequest {
    pub image: Image,
}

/// Inline image payload; `bytes` is base64 encoded on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub bytes: String,
}

/// Response body of `DetectModerationLabels`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectModerationLabelsResponse {
    #[serde(default)]
    pub moderation_labels: Vec<WireModerationLabel>,
    #[serde(default)]
    pub moderation_model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireModerationLabel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub parent_name: Option<String>,
}

impl From<WireModerationLabel> for ModerationLabel {
    fn from(label: WireModerationLabel) -> Self {
        ModerationLabel {
            name: label.name,
            confidence: label.confidence,
            // Top-level labels come back with an empty parent
            parent_name: label.parent_name.filter(|p| !p.is_empty()),
        }
    }
}

/// Error body returned by AWS JSON protocol services
#[derive(Debug, Deserialize)]
pub struct AwsErrorResponse {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
}

impl AwsErrorResponse {
    /// Exception name without the namespace prefix
    /// (`com.amazonaws.rekognition#AccessDeniedException` -> `AccessDeniedException`)
    pub fn short_type(&self) -> Option<&str> {
        self.error_type
            .as_deref()
            .map(|t| t.rsplit('#').next().unwrap_or(t))
    }
}
