// content-sentry - Image moderation scoring service backed by Amazon Rekognition
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod moderation;
pub mod rekognition;
pub mod server;
pub mod utils;
