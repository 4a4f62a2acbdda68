//! Response translation.
//!
//! # Responsibilities
//! - Re-frame the upstream body as JSON or text for the caller
//! - Preserve the upstream status code in every case
//! - Relay every upstream `Set-Cookie` as its own header
//!
//! # Design Decisions
//! - Malformed JSON under a JSON content type degrades to `{}`
//! - Cookies are never merged; a merged value breaks browser parsing
//! - Only `Content-Type` and `Set-Cookie` cross back from the upstream

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Content type used when the upstream sends text without one.
pub const DEFAULT_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Returns true if the content type denotes a JSON body.
pub fn is_json(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}

/// Translate an upstream response into the response sent to the caller.
pub fn translate(status: StatusCode, upstream: &HeaderMap, body: Bytes) -> Response {
    let content_type = upstream
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut response = if is_json(content_type) {
        let value = serde_json::from_slice::<Value>(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, status = %status, "Upstream sent malformed JSON");
            Value::Object(Default::default())
        });
        (status, Json(value)).into_response()
    } else {
        let content_type = upstream
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_TEXT_CONTENT_TYPE));
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        response
    };

    relay_set_cookies(upstream, response.headers_mut());
    response
}

/// Append each upstream `Set-Cookie` field separately.
///
/// A client that folded several cookies into a single field still yields
/// exactly that one value here, which is appended as-is.
pub fn relay_set_cookies(upstream: &HeaderMap, downstream: &mut HeaderMap) {
    for cookie in upstream.get_all(header::SET_COOKIE) {
        downstream.append(header::SET_COOKIE, cookie.clone());
    }
}
