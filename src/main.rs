// content-sentry - Image moderation scoring service backed by Amazon Rekognition
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use content_sentry::cli::Args;
use content_sentry::config::AppConfig;
use content_sentry::rekognition::RekognitionClient;
use content_sentry::server::create_router;
use content_sentry::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting content-sentry v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the Rekognition client once; credentials are resolved here
    let client = RekognitionClient::new(&config.rekognition)?;
    info!(
        "Using Rekognition endpoint {} in {}",
        client.endpoint(),
        client.region()
    );

    // Phase 4: Build and start HTTP server
    let app = create_router(config.clone(), Arc::new(client))?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
