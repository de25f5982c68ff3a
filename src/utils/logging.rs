//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! AWS credentials and request signatures from leaking into logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static SANITIZE_ENABLED: AtomicBool = AtomicBool::new(true);

lazy_static! {
    /// Long-term (AKIA) and temporary (ASIA) access key ids
    static ref ACCESS_KEY_ID: Regex = Regex::new(r"\b(?:AKIA|ASIA)[A-Z0-9]{16}\b").unwrap();

    /// Hex signature inside a SigV4 Authorization header
    static ref SIGNATURE: Regex = Regex::new(r"Signature=[0-9a-f]{64}").unwrap();
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    SANITIZE_ENABLED.store(config.sanitize_tokens, Ordering::Relaxed);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Sanitizes sensitive information from log messages.
///
/// Replaces AWS access key ids with `[REDACTED_ACCESS_KEY]` and SigV4
/// signatures with `Signature=[REDACTED]`. Returns the input unchanged when
/// `logging.sanitize_tokens` is disabled.
pub fn sanitize(input: &str) -> String {
    if !SANITIZE_ENABLED.load(Ordering::Relaxed) {
        return input.to_string();
    }

    let result = ACCESS_KEY_ID.replace_all(input, "[REDACTED_ACCESS_KEY]");
    SIGNATURE.replace_all(&result, "Signature=[REDACTED]").into_owned()
}
