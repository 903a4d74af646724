//! OCR Server
//!
//! HTTP service extracting text from images and PDFs with tesseract.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    tracing::info!("Starting OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        default_lang = %config.ocr.default_language,
        auto_langs = %config.ocr.auto_languages,
        max_dimension = config.image.max_dimension,
        color_mode = ?config.image.color_mode,
        "OCR settings"
    );

    let state = AppState::from_config(config.clone()).context("failed to build application state")?;

    if !state.ocr().recognizer_available().await {
        tracing::warn!(
            "Recognizer '{}' is not available; OCR requests will fail until it is installed",
            state.ocr().recognizer_name()
        );
    }

    let app = ocr_server::router(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.server.host, config.server.port))?;
    tracing::info!("OCR Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
