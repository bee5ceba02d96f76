//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers::{fixed_window, health_check, sliding_window, AppState};
use crate::error::{Result, TurnstileError};
use crate::ratelimit::{AdmissionService, LimiterKind};

/// Build the router serving both window algorithms.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            &format!("/{}", LimiterKind::Fixed.route_name()),
            get(fixed_window),
        )
        .route(
            &format!("/{}", LimiterKind::Sliding.route_name()),
            get(sliding_window),
        )
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the admission services.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Services handed to the handlers
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with one fixed and one sliding window service.
    pub fn new(
        addr: SocketAddr,
        fixed: Arc<AdmissionService>,
        sliding: Arc<AdmissionService>,
    ) -> Self {
        Self {
            addr,
            state: AppState { fixed, sliding },
        }
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server stops accepting connections when the provided signal
    /// resolves and returns once in-flight requests have completed.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        info!(
            addr = %local_addr,
            fixed_route = LimiterKind::Fixed.route_name(),
            sliding_route = LimiterKind::Sliding.route_name(),
            "Starting HTTP server with graceful shutdown"
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                TurnstileError::Server(e.to_string())
            })
    }
}
