//! Outbound request assembly.
//!
//! # Responsibilities
//! - Copy inbound headers for the upstream call
//! - Drop `Host` so the client targets the upstream host
//! - Re-set `Cookie` explicitly so the session always reaches the upstream
//! - Buffer the inbound body for methods that carry one
//!
//! # Design Decisions
//! - Hop-by-hop and framing headers are never copied; the client recomputes them
//! - `Accept-Encoding` is dropped because bodies are re-serialized here
//! - Bodies are forwarded byte-for-byte, never re-encoded

use axum::{
    body::{Body, Bytes},
    extract::FromRequest,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request},
};

use crate::http::forward::ForwardError;

/// Headers that are never copied to the upstream request.
const SKIPPED_HEADERS: [HeaderName; 10] = [
    header::HOST,
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::CONTENT_LENGTH,
    header::ACCEPT_ENCODING,
];

/// Build the upstream header set from the inbound headers.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound.iter() {
        if SKIPPED_HEADERS.contains(name) || *name == header::COOKIE {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(cookie) = inbound_cookie(inbound) {
        headers.insert(header::COOKIE, cookie);
    }

    headers
}

/// The inbound `Cookie` value. HTTP/2 clients may split cookies across
/// several fields; those are joined with "; " into one.
pub fn inbound_cookie(inbound: &HeaderMap) -> Option<HeaderValue> {
    let mut values = inbound.get_all(header::COOKIE).iter();
    let first = values.next()?;

    let rest: Vec<&HeaderValue> = values.collect();
    if rest.is_empty() {
        return Some(first.clone());
    }

    let mut joined = first.as_bytes().to_vec();
    for value in rest {
        joined.extend_from_slice(b"; ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}

/// GET and HEAD requests are forwarded without a body.
pub fn is_bodyless(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Buffer the inbound body. The size limit comes from the router's
/// `DefaultBodyLimit` layer.
pub async fn read_body(request: Request<Body>) -> Result<Bytes, ForwardError> {
    Bytes::from_request(request, &())
        .await
        .map_err(|rejection| ForwardError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        })
}
