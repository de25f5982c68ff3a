//! Image moderation adapter.
//!
//! This module translates between the HTTP contract (an uploaded image in,
//! a single probability out) and whatever moderation backend is plugged in
//! behind the [`ModerationService`] trait. The production backend is
//! [`crate::rekognition::RekognitionClient`].
//!
//! # Submodules
//!
//! - `models`: Upload, label and result types plus extension validation.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod models;

pub use models::{is_supported_file_name, ModerationLabel, ModerationResult, UploadedImage};

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// A remote service able to label image content.
#[async_trait]
pub trait ModerationService: Send + Sync {
    /// Return the labels detected for `image`, in the order the service ranks them.
    async fn detect_moderation_labels(&self, image: Bytes) -> Result<Vec<ModerationLabel>>;
}

/// Validates uploads and reduces the service response to one confidence value.
#[derive(Clone)]
pub struct ImageModerationAdapter {
    service: Arc<dyn ModerationService>,
}

impl ImageModerationAdapter {
    pub fn new(service: Arc<dyn ModerationService>) -> Self {
        Self { service }
    }

    /// Validate `image`, send it to the moderation service once, and return
    /// the confidence of the first label (0.0 if none).
    ///
    /// Invalid uploads never reach the service.
    pub async fn submit_image(&self, image: UploadedImage) -> Result<ModerationResult> {
        image.validate()?;

        debug!(
            "Submitting {} ({} bytes) for moderation",
            image.file_name,
            image.len()
        );

        let labels = self.service.detect_moderation_labels(image.bytes).await?;

        debug!("Moderation service returned {} labels", labels.len());

        Ok(ModerationResult::from_labels(&labels))
    }
}
