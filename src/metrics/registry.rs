// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of HTTP requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total number of API requests"),
        &["method", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Uploads rejected before reaching Rekognition
    pub static ref VALIDATION_REJECTIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("validation_rejections_total", "Uploads rejected by local validation"),
        &["reason"], // reason: no_file, unsupported_type
        REGISTRY
    ).unwrap();

    // ============================================================================
    // REKOGNITION METRICS
    // ============================================================================

    /// Total Rekognition calls
    pub static ref REKOGNITION_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rekognition_calls_total", "Total DetectModerationLabels calls"),
        &["outcome"], // outcome: success, error, transport_error
        REGISTRY
    ).unwrap();

    /// Rekognition call duration
    pub static ref REKOGNITION_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("rekognition_duration_seconds", "DetectModerationLabels call duration")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["outcome"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Vec metrics only appear once a label set has been touched
        REQUESTS_TOTAL.with_label_values(&["GET", "/health", "200"]).inc();
        REKOGNITION_CALLS.with_label_values(&["success"]).inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("requests_total"));
        assert!(metrics.contains("rekognition_calls_total"));
    }
}
