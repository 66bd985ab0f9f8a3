//! HTTP server for Prometheus metrics scraping
//!
//! This module provides a simple HTTP server that exposes a `/metrics` endpoint
//! for Prometheus to scrape metrics from DashFlow applications.
//!
//! # Example
//!
//! ```rust,no_run
//! use dashflow_observability::metrics_server::serve_metrics;
//! use dashflow_observability::metrics::init_default_recorder;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize metrics recorder
//! init_default_recorder()?;
//!
//! // Start metrics server on port 9090
//! serve_metrics(9090).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Start an HTTP server to serve Prometheus metrics
///
/// This starts a simple HTTP server on the specified port that exposes a `/metrics`
/// endpoint in Prometheus text format. The server will run until the process is terminated.
///
/// # Arguments
///
/// * `port` - Port to listen on (e.g., 9090). Use 0 to let the OS assign a port.
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_observability::metrics_server::serve_metrics;
/// use dashflow_observability::metrics::init_default_recorder;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Initialize metrics
/// init_default_recorder()?;
///
/// // Start server
/// serve_metrics(9090).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Prometheus Scrape Config
///
/// ```yaml
/// scrape_configs:
///   - job_name: 'dashflow'
///     static_configs:
///       - targets: ['localhost:9090']
/// ```
pub async fn serve_metrics(port: u16) -> Result<()> {
    let (_, server_future) = serve_metrics_with_addr(port).await?;
    server_future.await
}

/// Start an HTTP server and return the actual bound address
///
/// This is useful when port 0 is specified to let the OS assign a port.
/// Returns the actual bound socket address and a future that runs the server.
pub async fn serve_metrics_with_addr(
    port: u16,
) -> Result<(
    std::net::SocketAddr,
    impl std::future::Future<Output = Result<()>>,
)> {
    let registry = MetricsRegistry::global();

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(registry);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::error::Error::Metrics(format!("Failed to bind to {}: {}", addr, e)))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| crate::error::Error::Metrics(format!("Failed to get local addr: {}", e)))?;

    tracing::info!("Metrics server listening on http://{}/metrics", local_addr);

    let server_future = async move {
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::Error::Metrics(format!("Server error: {}", e)))?;
        Ok(())
    };

    Ok((local_addr, server_future))
}

/// Handler for the /metrics endpoint
async fn metrics_handler(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    match registry.export() {
        Ok(metrics) => (StatusCode::OK, metrics).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export metrics: {}", e),
        )
            .into_response(),
    }
}

/// Handler for the /health endpoint
async fn health_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}
