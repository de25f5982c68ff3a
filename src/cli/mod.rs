// CLI module for content-sentry
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// content-sentry - score uploaded images with Amazon Rekognition moderation labels
#[derive(Parser, Debug)]
#[command(name = "content-sentry", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.content-sentry/config.toml)
    #[arg(short, long, env = "CONTENT_SENTRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding server.port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
