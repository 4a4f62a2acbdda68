//! End-to-end forwarding tests against in-process upstreams.

use admin_gateway::config::RouteConfig;
use axum::http::{header, StatusCode};
use serde_json::Value;

mod common;

fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_forwards_query_and_cookie() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!(
            "http://{}/api/admin/registration-requests?status=PENDING",
            gateway
        ))
        .header("cookie", "access_token=abc; theme=dark")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["uri"], "/admin/registration-requests?status=PENDING");
    assert_eq!(seen["cookie"], "access_token=abc; theme=dark");
    assert_eq!(seen["cookie_fields"], 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_inbound_host_is_not_forwarded() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/auth/me", gateway))
        .header("host", "admin.example.com")
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["host"], upstream.to_string());
    assert_eq!(seen["uri"], "/auth/me");

    shutdown.trigger();
}

#[tokio::test]
async fn test_get_drops_inbound_body() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/admin/users", gateway))
        .body("should not travel")
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["body"], "");

    shutdown.trigger();
}

#[tokio::test]
async fn test_user_update_is_sent_as_patch() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .post(format!("http://{}/api/admin/users/42", gateway))
        .header("content-type", "application/json")
        .header("cookie", "access_token=abc")
        .body(r#"{"status":"BLOCKED"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "PATCH");
    assert_eq!(seen["uri"], "/admin/users/42");
    assert_eq!(seen["body"], r#"{"status":"BLOCKED"}"#);
    assert_eq!(seen["content_type"], "application/json");
    assert_eq!(seen["cookie"], "access_token=abc");

    shutdown.trigger();
}

#[tokio::test]
async fn test_approve_posts_without_body() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}/", upstream)).await;

    let res = common::client()
        .post(format!(
            "http://{}/api/admin/registration-requests/r-7/approve",
            gateway
        ))
        .send()
        .await
        .unwrap();

    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "POST");
    // Trailing slash on the base must not double up.
    assert_eq!(seen["uri"], "/admin/registration-requests/r-7/approve");
    assert_eq!(seen["body"], "");

    shutdown.trigger();
}

#[tokio::test]
async fn test_set_cookies_are_not_merged() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .post(format!("http://{}/api/auth/refresh", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(
        set_cookies(&res),
        vec!["session=abc; Path=/; HttpOnly", "flag=1; Path=/"]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_raw_set_cookie_fields_survive() {
    let upstream = common::start_raw_upstream(common::raw_response(
        "200 OK",
        &[
            ("Content-Type", "application/json"),
            ("Set-Cookie", "session=abc"),
            ("Set-Cookie", "flag=1"),
        ],
        r#"{"a":1}"#,
    ))
    .await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/auth/me", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(set_cookies(&res), vec!["session=abc", "flag=1"]);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"a": 1}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_json_keeps_status() {
    let upstream = common::start_raw_upstream(common::raw_response(
        "500 Internal Server Error",
        &[("Content-Type", "application/json")],
        "{not json",
    ))
    .await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/admin/users", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "{}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_text_response_passes_through() {
    let upstream = common::start_raw_upstream(common::raw_response(
        "404 Not Found",
        &[("Content-Type", "text/html")],
        "<h1>missing</h1>",
    ))
    .await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/auth/me", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "text/html");
    assert_eq!(res.text().await.unwrap(), "<h1>missing</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let dead = common::closed_addr().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", dead)).await;

    let res = common::client()
        .get(format!("http://{}/api/auth/me", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Upstream request failed");
    assert_eq!(
        admin_gateway::client::read_error(body.to_string().as_bytes()),
        "Upstream request failed"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_reaches_upstream() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    let res = common::client()
        .get(format!("http://{}/api/auth/me", gateway))
        .send()
        .await
        .unwrap();

    let request_id = res
        .headers()
        .get("x-request-id")
        .expect("response carries a request id")
        .to_str()
        .unwrap()
        .to_string();
    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["request_id"], request_id);

    shutdown.trigger();
}

#[tokio::test]
async fn test_encoded_dot_segments_are_not_forwarded() {
    let (upstream, seen) = common::start_recording_upstream().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", upstream)).await;

    for (method, target) in [
        ("POST", "/api/admin/registration-requests/%2e%2e/approve"),
        ("POST", "/api/admin/registration-requests/.%2E/reject"),
        ("POST", "/api/admin/users/%2E%2E"),
        ("PATCH", "/api/admin/users/%2e"),
    ] {
        let (status, body) = common::raw_request(gateway, method, target).await;
        assert_eq!(status, 404, "{} {}", method, target);
        assert!(body.contains("No matching route found"), "{}", body);
    }
    assert!(seen.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_head_is_forwarded_without_body() {
    let (upstream, seen) = common::start_recording_upstream().await;
    let routes = vec![RouteConfig {
        name: "users.head".into(),
        path: "/api/admin/users".into(),
        upstream: "/admin/users".into(),
        methods: vec!["HEAD".into()],
        upstream_method: None,
        forward_query: false,
    }];
    let (gateway, shutdown) =
        common::start_gateway_with_routes(&format!("http://{}", upstream), routes).await;

    let res = common::client()
        .head(format!("http://{}/api/admin/users", gateway))
        .body("should not travel")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["method"], "HEAD");
    assert_eq!(seen[0]["uri"], "/admin/users");
    assert_eq!(seen[0]["body"], "");

    shutdown.trigger();
}

#[tokio::test]
async fn test_override_to_get_drops_body() {
    let upstream = common::start_echo_upstream().await;
    let routes = vec![RouteConfig {
        name: "users.search".into(),
        path: "/api/admin/users/search".into(),
        upstream: "/admin/users".into(),
        methods: vec!["POST".into()],
        upstream_method: Some("GET".into()),
        forward_query: false,
    }];
    let (gateway, shutdown) =
        common::start_gateway_with_routes(&format!("http://{}", upstream), routes).await;

    let res = common::client()
        .post(format!("http://{}/api/admin/users/search", gateway))
        .header("content-type", "application/json")
        .body(r#"{"q":"alice"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let seen: Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["uri"], "/admin/users");
    assert_eq!(seen["body"], "");

    shutdown.trigger();
}
