// Rekognition API client
// Author: kelexine (https://github.com/kelexine)

use super::signing::{self, SigningInput};
use super::{
    AwsCredentials, AwsErrorResponse, DetectModerationLabelsRequest,
    DetectModerationLabelsResponse, Image, AMZ_JSON_CONTENT_TYPE,
    DETECT_MODERATION_LABELS_TARGET, SIGNING_SERVICE,
};
use crate::config::RekognitionConfig;
use crate::error::{DetectorError, Result};
use crate::metrics;
use crate::moderation::{ModerationLabel, ModerationService};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for Amazon Rekognition's `DetectModerationLabels` operation.
///
/// The region, endpoint and credentials are fixed at construction; the
/// underlying HTTP client keeps a connection pool shared by all requests.
pub struct RekognitionClient {
    http_client: Client,
    endpoint: Url,
    region: String,
    credentials: AwsCredentials,
}

impl RekognitionClient {
    /// Create a client, resolving credentials from config or the environment.
    pub fn new(config: &RekognitionConfig) -> Result<Self> {
        let credentials = AwsCredentials::resolve(config)?;
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: &RekognitionConfig, credentials: AwsCredentials) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| DetectorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint_url = config.endpoint_url();
        let endpoint = Url::parse(&endpoint_url).map_err(|e| {
            DetectorError::Config(format!("Invalid Rekognition endpoint {}: {}", endpoint_url, e))
        })?;

        debug!("Rekognition client targeting {} ({})", endpoint, config.region);

        Ok(Self {
            http_client,
            endpoint,
            region: config.region.clone(),
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Value of the `Host` header reqwest will send for the endpoint
    fn host_header(&self) -> Result<String> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| DetectorError::Config(format!("Endpoint {} has no host", self.endpoint)))?;

        Ok(match self.endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Build the header set for one call, including the SigV4 signature
    fn signed_headers(&self, payload: &[u8]) -> Result<Vec<(String, String)>> {
        let time = chrono::Utc::now();

        let mut headers = vec![
            ("content-type".to_string(), AMZ_JSON_CONTENT_TYPE.to_string()),
            ("host".to_string(), self.host_header()?),
            ("x-amz-date".to_string(), signing::amz_date(&time)),
            ("x-amz-target".to_string(), DETECT_MODERATION_LABELS_TARGET.to_string()),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let authorization = signing::authorization_header(
            &self.credentials,
            &SigningInput {
                method: "POST",
                path: self.endpoint.path(),
                query: self.endpoint.query().unwrap_or(""),
                headers: &headers,
                payload,
                region: &self.region,
                service: SIGNING_SERVICE,
                time,
            },
        );
        headers.push(("authorization".to_string(), authorization));

        // reqwest derives Host from the URL itself
        headers.retain(|(name, _)| name != "host");
        Ok(headers)
    }

    /// Send raw image bytes to `DetectModerationLabels` and return the labels
    /// in the order Rekognition ranked them.
    pub async fn detect_moderation_labels(&self, image: &[u8]) -> Result<Vec<ModerationLabel>> {
        let request = DetectModerationLabelsRequest {
            image: Image {
                bytes: base64::engine::general_purpose::STANDARD.encode(image),
            },
        };
        let body = serde_json::to_vec(&request)?;
        let headers = self.signed_headers(&body)?;

        let mut builder = self.http_client.post(self.endpoint.clone());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!("Calling DetectModerationLabels with {} image bytes", image.len());
        let start = Instant::now();

        let response = match builder.body(body).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_rekognition_call("transport_error", start.elapsed().as_secs_f64());
                error!("Rekognition request failed: {}", e);
                return Err(DetectorError::Service(format!("Rekognition request failed: {}", e)));
            }
        };

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            DetectorError::Service(format!("Failed to read Rekognition response body: {}", e))
        })?;
        let elapsed = start.elapsed().as_secs_f64();

        if !status.is_success() {
            metrics::record_rekognition_call("error", elapsed);
            error!(
                "Rekognition error: HTTP {} - Response body: {}",
                status,
                sanitize(&response_text)
            );
            return Err(DetectorError::Service(Self::describe_error(
                status.as_u16(),
                &response_text,
            )));
        }

        metrics::record_rekognition_call("success", elapsed);

        let parsed: DetectModerationLabelsResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                error!("Failed to parse Rekognition response: {}", e);
                DetectorError::Service(format!("Response parsing error: {}", e))
            })?;

        debug!(
            "Rekognition model {} returned {} labels",
            parsed.moderation_model_version.as_deref().unwrap_or("unknown"),
            parsed.moderation_labels.len()
        );

        Ok(parsed
            .moderation_labels
            .into_iter()
            .map(ModerationLabel::from)
            .collect())
    }

    /// Turn an AWS error body into `"<Exception>: <message>"`, falling back
    /// to the raw status and body
    fn describe_error(status: u16, response_text: &str) -> String {
        if let Ok(err) = serde_json::from_str::<AwsErrorResponse>(response_text) {
            match (err.short_type(), err.message.as_deref()) {
                (Some(kind), Some(message)) => return format!("{}: {}", kind, message),
                (Some(kind), None) => return kind.to_string(),
                (None, Some(message)) => return message.to_string(),
                (None, None) => {}
            }
        }
        format!("HTTP {}: {}", status, response_text)
    }
}

#[async_trait]
impl ModerationService for RekognitionClient {
    async fn detect_moderation_labels(&self, image: Bytes) -> Result<Vec<ModerationLabel>> {
        RekognitionClient::detect_moderation_labels(self, &image).await
    }
}
