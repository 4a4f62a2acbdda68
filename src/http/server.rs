//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health endpoint and the forwarding fallback
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener with graceful shutdown
//! - Dispatch requests through the forwarding table
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::forward::{ForwardError, Forwarder, UpstreamBase, UpstreamUrlError};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{RouteMatch, Router as ProxyRouter};

/// Errors that prevent the server from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("upstream base URL is not configured")]
    MissingUpstream,

    #[error("invalid upstream base URL: {0}")]
    InvalidUpstream(#[from] UpstreamUrlError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the admin gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let raw_base = config
            .upstream
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(StartupError::MissingUpstream)?;
        let base = UpstreamBase::parse(raw_base)?;

        let forwarder = Arc::new(Forwarder::new(base, &config.timeouts)?);
        let proxy_router = Arc::new(ProxyRouter::from_config(&config.routes));

        tracing::info!(
            upstream = %forwarder.base().as_str(),
            routes = proxy_router.len(),
            "Forwarding table ready"
        );

        let state = AppState {
            router: proxy_router,
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(health_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` is triggered, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let stop = shutdown.notified();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                stop.await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    routes: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        routes: state.router.len(),
    })
}

/// Main forwarding handler.
/// Resolves the rule for the request and relays it upstream.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let route = match state.router.resolve(&method, request.uri()) {
        RouteMatch::Matched(route) => route,
        RouteMatch::MethodNotAllowed { allowed } => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            metrics::record_request(&method, StatusCode::METHOD_NOT_ALLOWED, "none", start_time);
            return method_not_allowed(&allowed);
        }
        RouteMatch::NotFound => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(&method, StatusCode::NOT_FOUND, "none", start_time);
            return json_error(StatusCode::NOT_FOUND, "No matching route found");
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name,
        "Proxying request"
    );

    let response = match state.forwarder.forward(request, &route).await {
        Ok(response) => response,
        Err(e) => {
            if let ForwardError::Upstream(_) = e {
                metrics::record_upstream_error(&route.name);
                tracing::error!(request_id = %request_id, route = %route.name, error = %e, "Upstream error");
            } else {
                tracing::warn!(request_id = %request_id, route = %route.name, error = %e, "Rejected request body");
            }
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status(), &route.name, start_time);
    response
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}
