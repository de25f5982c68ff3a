//! Utility functions and helpers for content-sentry.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and credential scrubbing for log output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
