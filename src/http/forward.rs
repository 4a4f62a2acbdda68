//! Upstream forwarding.
//!
//! One inbound request becomes one outbound request against the upstream
//! base URL; the upstream response is translated back for the caller.
//!
//! # Data Flow
//! ```text
//! inbound Request + ResolvedRoute
//!     → UpstreamBase::join (target URL)
//!     → request.rs (headers, cookie, body)
//!     → reqwest (upstream call, method from the route)
//!     → response.rs (JSON/text framing, Set-Cookie relay)
//! ```
//!
//! # Design Decisions
//! - Stateless: the forwarder holds only immutable config and a client pool
//! - No retries; transport failures surface as 502 (504 on timeout)

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::config::schema::TimeoutConfig;
use crate::http::{request, response};
use crate::routing::ResolvedRoute;

/// Reasons an upstream base URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamUrlError {
    #[error("not an absolute URL: {0}")]
    Malformed(String),

    #[error("unsupported scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Validated upstream base URL, stored without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase(String);

impl UpstreamBase {
    /// Parse and normalize a base URL.
    pub fn parse(raw: &str) -> Result<Self, UpstreamUrlError> {
        let trimmed = raw.trim();
        let url = url::Url::parse(trimmed).map_err(|e| UpstreamUrlError::Malformed(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(UpstreamUrlError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(UpstreamUrlError::MissingHost);
        }

        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// Join a path (with optional query) onto the base with exactly one `/`.
    pub fn join(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.0, path_and_query)
        } else {
            format!("{}/{}", self.0, path_and_query)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors surfaced to the caller instead of an upstream response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("{message}")]
    Body { status: StatusCode, message: String },
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ForwardError::Body { status, .. } => *status,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let message = match &self {
            ForwardError::Upstream(e) if e.is_timeout() => "Upstream request timed out".to_string(),
            ForwardError::Upstream(_) => "Upstream request failed".to_string(),
            ForwardError::Body { message, .. } => message.clone(),
        };
        (self.status(), Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Relays requests to the upstream API.
#[derive(Debug, Clone)]
pub struct Forwarder {
    base: UpstreamBase,
    client: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder with its own connection pool.
    pub fn new(base: UpstreamBase, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if let Some(secs) = timeouts.upstream_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base,
            client: builder.build()?,
        })
    }

    pub fn base(&self) -> &UpstreamBase {
        &self.base
    }

    /// Forward `request` along `route` and translate the upstream response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        route: &ResolvedRoute,
    ) -> Result<Response, ForwardError> {
        let url = self.base.join(&route.path_and_query);
        let headers = request::outbound_headers(request.headers());

        let body = if request::is_bodyless(request.method()) || request::is_bodyless(&route.method) {
            None
        } else {
            Some(request::read_body(request).await?)
        };

        tracing::debug!(
            route = %route.name,
            method = %route.method,
            url = %url,
            body_bytes = body.as_ref().map(Bytes::len).unwrap_or(0),
            "Forwarding to upstream"
        );

        let mut outbound = self
            .client
            .request(route.method.clone(), &url)
            .headers(headers);
        if let Some(body) = body {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await.map_err(ForwardError::Upstream)?;
        let status = upstream.status();
        let upstream_headers = upstream.headers().clone();
        let bytes = upstream.bytes().await.map_err(ForwardError::Upstream)?;

        tracing::debug!(route = %route.name, status = %status, "Upstream responded");

        Ok(response::translate(status, &upstream_headers, bytes))
    }
}
