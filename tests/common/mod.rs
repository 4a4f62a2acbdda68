//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use admin_gateway::config::{GatewayConfig, RouteConfig};
use admin_gateway::http::HttpServer;
use admin_gateway::lifecycle::Shutdown;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Descriptions of every request an echo upstream has received.
pub type Seen = Arc<Mutex<Vec<Value>>>;

/// Start an upstream that answers every request with a JSON description of
/// what it received, and sets two cookies.
pub async fn start_echo_upstream() -> SocketAddr {
    start_recording_upstream().await.0
}

/// Echo upstream that also keeps what it received, for requests whose
/// response body never reaches the test (HEAD).
pub async fn start_recording_upstream() -> (SocketAddr, Seen) {
    serve_upstream(None).await
}

/// Upstream that records each request and always answers with `reply`.
#[allow(dead_code)]
pub async fn start_json_upstream(reply: Value) -> (SocketAddr, Seen) {
    serve_upstream(Some(reply)).await
}

#[derive(Clone)]
struct Upstream {
    seen: Seen,
    reply: Option<Value>,
}

async fn serve_upstream(reply: Option<Value>) -> (SocketAddr, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Seen::default();
    let state = Upstream {
        seen: seen.clone(),
        reply,
    };
    let app = Router::new().fallback(echo).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, seen)
}

async fn echo(
    State(upstream): State<Upstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let description = serde_json::json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "host": header_str("host"),
        "cookie": header_str("cookie"),
        "cookie_fields": headers.get_all(header::COOKIE).iter().count(),
        "request_id": header_str("x-request-id"),
        "content_type": header_str("content-type"),
        "body": String::from_utf8_lossy(&body),
    });

    upstream.seen.lock().unwrap().push(description.clone());

    let reply = upstream.reply.unwrap_or(description);
    let mut response = (StatusCode::OK, Json(reply)).into_response();
    let headers = response.headers_mut();
    headers.append(header::SET_COOKIE, HeaderValue::from_static("session=abc; Path=/; HttpOnly"));
    headers.append(header::SET_COOKIE, HeaderValue::from_static("flag=1; Path=/"));
    response
}

/// Start an upstream that writes `response` verbatim to every connection.
pub async fn start_raw_upstream(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Format a raw HTTP/1.1 response.
pub fn raw_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    out
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start the gateway against `base_url` with the default route table.
pub async fn start_gateway(base_url: &str) -> (SocketAddr, Shutdown) {
    start_gateway_with_routes(base_url, GatewayConfig::default().routes).await
}

/// Start the gateway against `base_url` with a custom route table.
#[allow(dead_code)]
pub async fn start_gateway_with_routes(
    base_url: &str,
    routes: Vec<RouteConfig>,
) -> (SocketAddr, Shutdown) {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = Some(base_url.to_string());
    config.routes = routes;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Send `method target` over a bare socket, bypassing client-side URL
/// normalization. Returns the status code and the response body.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, method: &str, target: &str) -> (u16, String) {
    let mut socket = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        method, target, addr
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw).to_string();

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}
