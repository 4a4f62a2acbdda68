//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admin gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API settings.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Forwarding rules, checked in declaration order.
    pub routes: Vec<RouteConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: default_routes(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream API configuration.
///
/// `base_url` has no default: a gateway without an upstream refuses to start.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (e.g., "https://api.example.com").
    pub base_url: Option<String>,
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total upstream call timeout in seconds. Unset means wait indefinitely.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: None,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A forwarding rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Inbound path pattern, e.g. `/api/admin/users/{id}`.
    pub path: String,

    /// Upstream path template, e.g. `/admin/users/{id}`.
    pub upstream: String,

    /// Inbound methods accepted by this rule.
    pub methods: Vec<String>,

    /// Method used against the upstream instead of the inbound one.
    #[serde(default)]
    pub upstream_method: Option<String>,

    /// Append the inbound query string to the upstream path.
    #[serde(default)]
    pub forward_query: bool,
}

impl RouteConfig {
    fn new(name: &str, path: &str, upstream: &str, methods: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            upstream: upstream.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            upstream_method: None,
            forward_query: false,
        }
    }

    fn with_query(mut self) -> Self {
        self.forward_query = true;
        self
    }

    fn with_upstream_method(mut self, method: &str) -> Self {
        self.upstream_method = Some(method.to_string());
        self
    }
}

/// The route table used by the admin panel.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new(
            "registration-requests.list",
            "/api/admin/registration-requests",
            "/admin/registration-requests",
            &["GET"],
        )
        .with_query(),
        RouteConfig::new(
            "registration-requests.approve",
            "/api/admin/registration-requests/{id}/approve",
            "/admin/registration-requests/{id}/approve",
            &["POST"],
        ),
        RouteConfig::new(
            "registration-requests.reject",
            "/api/admin/registration-requests/{id}/reject",
            "/admin/registration-requests/{id}/reject",
            &["POST"],
        ),
        RouteConfig::new("users.list", "/api/admin/users", "/admin/users", &["GET"]).with_query(),
        // Browsers post the form; the upstream only exposes PATCH.
        RouteConfig::new(
            "users.update",
            "/api/admin/users/{id}",
            "/admin/users/{id}",
            &["POST", "PATCH"],
        )
        .with_upstream_method("PATCH"),
        RouteConfig::new("auth.me", "/api/auth/me", "/auth/me", &["GET"]),
        RouteConfig::new("auth.refresh", "/api/auth/refresh", "/auth/refresh", &["POST"]),
    ]
}
