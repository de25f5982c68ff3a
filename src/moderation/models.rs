// Moderation models and upload validation
// Author: kelexine (https://github.com/kelexine)

use crate::error::{DetectorError, Result, NO_FILE_MESSAGE, UNSUPPORTED_TYPE_MESSAGE};
use bytes::Bytes;
use phf::phf_set;
use serde::{Deserialize, Serialize};

/// Extensions (lower-case, without the dot) accepted for analysis
static ALLOWED_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "jpg",
    "jpeg",
    "png",
    "gif",
};

/// An image received from a client, held fully in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the image is non-empty and carries an accepted extension.
    ///
    /// Only the declared file name is inspected; the bytes themselves are
    /// left for Rekognition to judge.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(DetectorError::Validation(NO_FILE_MESSAGE.to_string()));
        }

        if !is_supported_file_name(&self.file_name) {
            return Err(DetectorError::Validation(UNSUPPORTED_TYPE_MESSAGE.to_string()));
        }

        Ok(())
    }
}

/// Text after the last `.` of the final path segment, if any.
///
/// A leading dot counts, so `.png` has the extension `png`.
fn file_extension(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.contains(|c: char| c == '/' || c == '\\') {
        return None;
    }
    Some(ext)
}

/// Whether a file name ends in one of the accepted image extensions
pub fn is_supported_file_name(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A single moderation label as reported by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationLabel {
    pub name: String,
    /// Percentage in [0, 100]
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl ModerationLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
            parent_name: None,
        }
    }
}

/// Response body of the analyze endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    #[serde(rename = "Probability")]
    pub probability: f32,
}

impl ModerationResult {
    /// Confidence of the first label, or 0.0 when the service reported none
    pub fn from_labels(labels: &[ModerationLabel]) -> Self {
        let probability = labels.first().map(|label| label.confidence).unwrap_or(0.0);
        Self { probability }
    }
}
