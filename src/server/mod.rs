//! HTTP serving: router assembly and the blocking serve entry point.
//!
//! Requests are independent and stateless end to end; the only shared
//! resource is the read-only model state loaded once at startup.

mod handlers;
mod pages;
pub mod types;

pub use types::{AppState, HealthResponse, ServerConfig, ServerMetrics};

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use colored::Colorize;

use crate::error::{CultivarError, Result};

/// Assemble the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/predict", post(handlers::predict))
        .route("/download_report", post(handlers::download_report))
        .route("/health", get(handlers::health))
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Serve entry point (blocking)
pub fn run(config: ServerConfig) -> Result<()> {
    println!("{}", "=== Cultivar Serve ===".cyan().bold());
    println!();
    println!("Model directory: {}", config.model_dir.display());
    println!("Binding: {}", config.bind_addr());
    println!();

    let state = Arc::new(AppState::initialize(&config));
    if !state.models_loaded() {
        println!(
            "{}",
            "Running degraded: predictions will fail until model files are restored".yellow()
        );
    }

    println!();
    println!("{}", "Endpoints:".green().bold());
    println!("  GET  /                 - Input form");
    println!("  POST /predict          - Crop recommendation");
    println!("  POST /download_report  - PDF report download");
    println!("  GET  /health           - Health check");

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CultivarError::Server(format!("Failed to create runtime: {e}")))?;

    let bind_addr = config.bind_addr();
    runtime.block_on(async move {
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| CultivarError::Server(format!("Failed to bind: {e}")))?;

        println!();
        println!(
            "{}",
            format!("Server listening on http://{bind_addr}")
                .green()
                .bold()
        );
        println!();
        println!("{}", "Press Ctrl+C to stop".dimmed());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CultivarError::Server(format!("Server error: {e}")))?;

        println!();
        println!("{}", "Server stopped".yellow());
        Ok(())
    })
}

/// Shutdown signal handler
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
