// End-to-end tests for the analyze-image endpoint
// Author: kelexine (https://github.com/kelexine)

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use content_sentry::config::AppConfig;
use content_sentry::error::{DetectorError, Result};
use content_sentry::moderation::{ModerationLabel, ModerationService};
use content_sentry::server::create_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "content-sentry-test-boundary";

enum Behavior {
    Labels(Vec<ModerationLabel>),
    Fail(String),
    Panic,
}

struct MockService {
    behavior: Behavior,
    calls: AtomicUsize,
    last_len: AtomicUsize,
}

impl MockService {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModerationService for MockService {
    async fn detect_moderation_labels(&self, image: Bytes) -> Result<Vec<ModerationLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_len.store(image.len(), Ordering::SeqCst);
        match &self.behavior {
            Behavior::Labels(labels) => Ok(labels.clone()),
            Behavior::Fail(message) => Err(DetectorError::Service(message.clone())),
            Behavior::Panic => panic!("moderation backend exploded"),
        }
    }
}

fn app(service: Arc<MockService>) -> Router {
    create_router(AppConfig::default(), service).unwrap()
}

fn multipart_body(field: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match file_name {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/content")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_png_returns_first_label_confidence() {
    let service = MockService::new(Behavior::Labels(vec![
        ModerationLabel::new("Explicit Nudity", 87.5),
        ModerationLabel::new("Suggestive", 60.2),
    ]));
    let image = vec![0x89u8; 10 * 1024];

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", Some("photo.png"), &image)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Probability": 87.5 }));
    assert_eq!(service.calls(), 1);
    assert_eq!(service.last_len.load(Ordering::SeqCst), 10 * 1024);
}

#[tokio::test]
async fn test_no_labels_returns_zero() {
    let service = MockService::new(Behavior::Labels(Vec::new()));

    let (status, body) = send(
        app(service),
        upload_request(multipart_body("imageFile", Some("cat.jpg"), b"jpeg-bytes")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Probability": 0.0 }));
}

#[tokio::test]
async fn test_missing_file_field() {
    let service = MockService::new(Behavior::Labels(Vec::new()));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("description", None, b"just text")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "Error": "No image file found in the request." }));
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_field_without_file_name_is_not_a_file() {
    let service = MockService::new(Behavior::Labels(Vec::new()));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", None, b"not a file")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Error"], "No image file found in the request.");
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_non_multipart_body() {
    let service = MockService::new(Behavior::Labels(Vec::new()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/content")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image": "nope"}"#))
        .unwrap();

    let (status, body) = send(app(service.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Error"], "No image file found in the request.");
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_empty_file_rejected() {
    let service = MockService::new(Behavior::Labels(Vec::new()));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", Some("empty.png"), b"")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "Error": "No image file found in the request." }));
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_bmp_rejected() {
    let service = MockService::new(Behavior::Labels(Vec::new()));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", Some("scan.bmp"), b"BM....")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "Error": "Please upload a valid image file (JPEG, PNG, or GIF)." })
    );
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_dotfile_named_after_extension_is_accepted() {
    let service = MockService::new(Behavior::Labels(vec![ModerationLabel::new("Suggestive", 12.5)]));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", Some(".png"), b"\x89PNG....")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Probability": 12.5 }));
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_field_name_case_insensitive_and_extension_upper_case() {
    let service = MockService::new(Behavior::Labels(vec![ModerationLabel::new("Suggestive", 42.0)]));

    let (status, body) = send(
        app(service),
        upload_request(multipart_body("ImageFile", Some("ANIMATION.GIF"), b"GIF89a....")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Probability": 42.0 }));
}

#[tokio::test]
async fn test_service_failure_returns_500() {
    let service = MockService::new(Behavior::Fail(
        "AccessDeniedException: User is not authorized to perform: rekognition:DetectModerationLabels"
            .to_string(),
    ));

    let (status, body) = send(
        app(service.clone()),
        upload_request(multipart_body("imageFile", Some("photo.jpeg"), b"data")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["Error"],
        "An error occurred: AccessDeniedException: User is not authorized to perform: rekognition:DetectModerationLabels"
    );
    assert!(body.get("Probability").is_none());
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_panic_is_reported_as_json_500() {
    let service = MockService::new(Behavior::Panic);

    let (status, body) = send(
        app(service),
        upload_request(multipart_body("imageFile", Some("photo.png"), b"data")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["Error"].as_str().unwrap();
    assert!(message.starts_with("An error occurred: "));
    assert!(message.contains("moderation backend exploded"));
    assert!(body.get("Probability").is_none());
}

#[tokio::test]
async fn test_health_endpoint() {
    let service = MockService::new(Behavior::Labels(Vec::new()));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app(service), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["region"], "us-east-1");
    assert_eq!(body["endpoint"], "https://rekognition.us-east-1.amazonaws.com/");
}

#[tokio::test]
async fn test_metrics_endpoint_reports_requests() {
    let service = MockService::new(Behavior::Labels(Vec::new()));
    let router = app(service);

    let _ = send(
        router.clone(),
        upload_request(multipart_body("imageFile", Some("photo.txt"), b"text")),
    )
    .await;

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("requests_total"));
    assert!(text.contains("validation_rejections_total"));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let service = MockService::new(Behavior::Labels(Vec::new()));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app(service).oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
