//! AWS Signature Version 4 request signing.
//!
//! Rekognition rejects unsigned requests, so every call made by
//! [`super::RekognitionClient`] carries an `Authorization` header built here.
//! Only what the JSON protocol needs is implemented: header signing with a
//! fully buffered payload.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::AwsCredentials;
use chrono::{DateTime, Utc};
use ring::hmac;
use sha2::{Digest, Sha256};

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything needed to sign one request.
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    /// Headers to sign, as (name, value); names are lower-cased during signing
    pub headers: &'a [(String, String)],
    pub payload: &'a [u8],
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

/// `YYYYMMDD'T'HHMMSS'Z'` timestamp used in `x-amz-date`
pub fn amz_date(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

fn short_date(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Derive the per-day, per-region, per-service signing key
pub fn signing_key(secret_access_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_access_key).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs.join("&")
}

/// Lower-cased, trimmed, sorted headers plus the `;`-joined signed header list
fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut normalized: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            (name.to_ascii_lowercase(), value)
        })
        .collect();
    normalized.sort();

    let canonical = normalized
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect::<String>();
    let signed = normalized
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    (canonical, signed)
}

pub fn canonical_request(input: &SigningInput<'_>) -> (String, String) {
    let (headers, signed_headers) = canonical_headers(input.headers);
    let path = if input.path.is_empty() { "/" } else { input.path };

    let request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        input.method,
        path,
        canonical_query(input.query),
        headers,
        signed_headers,
        sha256_hex(input.payload)
    );

    (request, signed_headers)
}

/// Compute the value of the `Authorization` header for `input`.
///
/// `input.headers` must already contain `host` and `x-amz-date`, and the
/// `x-amz-date` value must match `input.time`.
pub fn authorization_header(credentials: &AwsCredentials, input: &SigningInput<'_>) -> String {
    let date = short_date(&input.time);
    let scope = format!("{}/{}/{}/aws4_request", date, input.region, input.service);

    let (request, signed_headers) = canonical_request(input);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date(&input.time),
        scope,
        sha256_hex(request.as_bytes())
    );

    let key = signing_key(&credentials.secret_access_key, &date, input.region, input.service);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    )
}
