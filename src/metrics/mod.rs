// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    VALIDATION_REJECTIONS,
    REKOGNITION_CALLS,
    REKOGNITION_DURATION,
};

/// Helper to record request metrics
pub fn record_request(method: &str, endpoint: &str, status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();

    REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, endpoint, &status])
        .observe(duration_secs);
}

/// Helper to record a DetectModerationLabels call
pub fn record_rekognition_call(outcome: &str, duration_secs: f64) {
    REKOGNITION_CALLS.with_label_values(&[outcome]).inc();
    REKOGNITION_DURATION
        .with_label_values(&[outcome])
        .observe(duration_secs);
}

pub fn record_validation_rejection(reason: &str) {
    VALIDATION_REJECTIONS.with_label_values(&[reason]).inc();
}
