//! Axum-based HTTP server for content-sentry.
//!
//! This module sets up the HTTP server, wires the routes, and turns every
//! request outcome into a JSON response.
//!
//! # Components
//!
//! - `handlers`: The analyze-image, health and metrics endpoints.
//! - `middleware`: Request ID tracking and panic-to-500 conversion.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthResponse, IMAGE_FIELD};
pub use routes::{create_router, AppState, ANALYZE_IMAGE_PATH};
