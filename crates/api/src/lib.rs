//! Kavenegar SMS Relay
//!
//! Receives Alertmanager webhooks and relays critical alerts as SMS.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use sms_gateway::{build_http_client, DeliveryError, KavenegarClient, SmsSender, DEFAULT_HTTP_TIMEOUT};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
mod routes;

pub use crate::config::{AppConfig, ConfigError, LogFormat};

use alerting::AlertProcessor;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] DeliveryError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Application state shared across handlers, immutable after startup
pub struct AppState {
    /// Alert filtering and SMS delivery
    pub processor: AlertProcessor,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state around an already constructed processor
    pub fn new(processor: AlertProcessor) -> Self {
        Self {
            processor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Build state from configuration, wiring a Kavenegar client over `http`
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let mut client = KavenegarClient::new(&config.api_key, &config.sender, http);
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url);
        }
        let sender: Arc<dyn SmsSender> = Arc::new(client);
        Self::new(AlertProcessor::new(sender, config.receivers.clone()))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub receivers: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/kavenegar", post(routes::webhook::receive_webhook))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        receivers: state.processor.receivers().len(),
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(format: LogFormat) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
}

/// Run the server until Ctrl-C or SIGTERM
pub async fn run_server(config: AppConfig, metrics: Option<PrometheusHandle>) -> Result<(), ServerError> {
    let http = build_http_client(DEFAULT_HTTP_TIMEOUT)?;

    let mut state = AppState::from_config(&config, http);
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;

    info!(
        addr = %config.listen_addr,
        receivers = config.receivers.len(),
        "kavenegar-sms listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
