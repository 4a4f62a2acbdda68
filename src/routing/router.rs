//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled forwarding rules
//! - Resolve a request to an upstream method and path
//! - Return matched route, method mismatch, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; first match wins
//! - Method override is rule data, not a per-route code path

use axum::http::{Method, Uri};

use crate::config::RouteConfig;
use crate::routing::matcher::PathPattern;

/// Parse an HTTP method token, normalizing to upper case.
pub fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid method '{}'", raw))
}

/// A compiled forwarding rule.
#[derive(Debug, Clone)]
pub struct ForwardingRule {
    pub name: String,
    pub pattern: PathPattern,
    pub upstream: String,
    pub methods: Vec<Method>,
    pub upstream_method: Option<Method>,
    pub forward_query: bool,
}

impl ForwardingRule {
    /// Compile a rule from config.
    pub fn compile(config: &RouteConfig) -> Result<Self, String> {
        let methods = config
            .methods
            .iter()
            .map(|m| parse_method(m))
            .collect::<Result<Vec<_>, _>>()?;
        let upstream_method = config
            .upstream_method
            .as_deref()
            .map(parse_method)
            .transpose()?;

        Ok(Self {
            name: config.name.clone(),
            pattern: PathPattern::parse(&config.path)?,
            upstream: config.upstream.clone(),
            methods,
            upstream_method,
            forward_query: config.forward_query,
        })
    }
}

/// Where and how a request is sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Name of the rule that matched.
    pub name: String,
    /// Method used against the upstream.
    pub method: Method,
    /// Upstream path, including `?query` when the rule forwards it.
    pub path_and_query: String,
}

/// Outcome of a route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(ResolvedRoute),
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// Immutable forwarding table.
#[derive(Debug, Default)]
pub struct Router {
    rules: Vec<ForwardingRule>,
}

impl Router {
    /// Build the router from configuration.
    ///
    /// Invalid rules are skipped with an error log; `validate_config` rejects
    /// them before a server is ever built.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let rules = routes
            .iter()
            .filter_map(|route| match ForwardingRule::compile(route) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::error!(route = %route.name, error = %e, "Skipping invalid route");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve an inbound method and URI.
    pub fn resolve(&self, method: &Method, uri: &Uri) -> RouteMatch {
        let mut allowed: Vec<Method> = Vec::new();

        for rule in &self.rules {
            let Some(params) = rule.pattern.captures(uri.path()) else {
                continue;
            };

            if !rule.methods.contains(method) {
                for m in &rule.methods {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
                continue;
            }

            let mut path_and_query = PathPattern::render(&rule.upstream, &params);
            if rule.forward_query {
                if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
                    path_and_query.push('?');
                    path_and_query.push_str(query);
                }
            }

            return RouteMatch::Matched(ResolvedRoute {
                name: rule.name.clone(),
                method: rule.upstream_method.clone().unwrap_or_else(|| method.clone()),
                path_and_query,
            });
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allowed }
        }
    }
}
