//! Server configuration, shared state, and response types.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::http::StatusCode;
use colored::Colorize;

use crate::model::ModelBundle;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the two model artifacts
    pub model_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_dir: PathBuf::from("model"),
        }
    }
}

impl ServerConfig {
    /// Create config with custom port (builder pattern, used in tests)
    #[cfg(test)]
    pub(crate) fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create config with custom host (builder pattern, used in tests)
    #[cfg(test)]
    pub(crate) fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Get bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Request counters (thread-safe), surfaced in the health body.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Total requests received
    pub requests_total: AtomicU64,
    /// Successful requests (2xx)
    pub requests_success: AtomicU64,
    /// Client errors (4xx)
    pub requests_client_error: AtomicU64,
    /// Server errors (5xx)
    pub requests_server_error: AtomicU64,
    /// Server start time (for uptime calculation)
    start_time: OnceLock<Instant>,
}

impl ServerMetrics {
    /// Create new metrics with server start time
    pub fn new() -> Arc<Self> {
        let metrics = Arc::new(Self::default());
        let _ = metrics.start_time.set(Instant::now());
        metrics
    }

    /// Record a finished request by status class
    pub fn record(&self, status: StatusCode) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if status.is_success() {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else if status.is_client_error() {
            self.requests_client_error.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            self.requests_server_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Uptime in whole seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time
            .get()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }
}

/// Process-wide state shared by every handler.
///
/// The artifacts are loaded once here and never mutated afterwards;
/// the degraded "models unavailable" state is the explicit `None`
/// value rather than an implicit absence.
pub struct AppState {
    /// Loaded artifacts, or `None` for the process lifetime on failure
    pub models: Option<ModelBundle>,
    /// Request counters
    pub metrics: Arc<ServerMetrics>,
}

impl AppState {
    /// Load artifacts from the configured directory, entering the
    /// degraded state (with a logged reason) on any failure.
    pub fn initialize(config: &ServerConfig) -> Self {
        let models = match ModelBundle::load(&config.model_dir) {
            Ok(bundle) => {
                println!(
                    "{}",
                    format!("Models loaded: {} crop classes", bundle.n_classes()).green()
                );
                Some(bundle)
            }
            Err(e) => {
                eprintln!("{}", format!("Error loading models: {e}").red());
                None
            }
        };
        Self {
            models,
            metrics: ServerMetrics::new(),
        }
    }

    /// Build state around an already-loaded bundle (tests, embedding).
    pub fn with_bundle(models: Option<ModelBundle>) -> Self {
        Self {
            models,
            metrics: ServerMetrics::new(),
        }
    }

    /// True when both artifacts loaded at startup
    pub fn models_loaded(&self) -> bool {
        self.models.is_some()
    }
}

/// Health check response body
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    /// "healthy" when artifacts loaded, "degraded" otherwise
    pub status: String,
    /// Whether classifier and decoder loaded at startup
    pub models_loaded: bool,
    /// RFC 3339 timestamp of this response
    pub timestamp: String,
    /// Server version (semver)
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Total requests processed
    pub requests_total: u64,
}
