//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single relay handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and stop on shutdown
//! - Hand every query string to the routing engine

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::status_for;
use crate::observability::metrics;
use crate::routing::{RelayContext, Router as RelayRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: RelayRouter,
}

/// HTTP front end of the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server with a context built from `config`.
    pub fn new(config: RelayConfig) -> Self {
        let context = Arc::new(RelayContext::new(&config));
        Self::with_context(config, context)
    }

    /// Create a server around an existing context.
    pub fn with_context(config: RelayConfig, context: Arc<RelayContext>) -> Self {
        let state = AppState {
            router: RelayRouter::new(context),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(relay_handler))
            .route("/{*path}", get(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The router with its middleware, for driving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Relay one request through the routing engine.
async fn relay_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers);
    let query = query.unwrap_or_default();
    tracing::debug!(request_id = %request_id, query = %query, "Relaying request");

    match state.router.handle(&query).await {
        Ok(response) => {
            metrics::record_request(response.kind, 200);
            response.into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            tracing::error!(request_id = %request_id, status = status.as_u16(), error = %e, "Relay failed");
            metrics::record_request("error", status.as_u16());
            e.into_response()
        }
    }
}
