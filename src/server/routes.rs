// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{analyze_image_handler, health_handler, metrics_handler};
use super::middleware::{catch_panic_layer, request_id_layers};
use crate::config::AppConfig;
use crate::error::Result;
use crate::moderation::{ImageModerationAdapter, ModerationService};
use axum::extract::DefaultBodyLimit;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Path of the analyze-image endpoint
pub const ANALYZE_IMAGE_PATH: &str = "/api/content";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub adapter: ImageModerationAdapter,
}

pub fn create_router(config: AppConfig, service: Arc<dyn ModerationService>) -> Result<Router> {
    let max_upload_bytes = config.server.max_upload_bytes;
    let state = AppState {
        config,
        adapter: ImageModerationAdapter::new(service),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(ANALYZE_IMAGE_PATH, post(analyze_image_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
