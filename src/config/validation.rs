//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require an absolute http(s) upstream base URL
//! - Check every forwarding rule compiles (pattern, methods, placeholders)
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};
use crate::http::forward::UpstreamBase;
use crate::routing::matcher::PathPattern;
use crate::routing::router::parse_method;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream base URL is not configured (set API_URL or upstream.base_url)")]
    MissingUpstream,

    #[error("invalid upstream base URL '{url}': {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("duplicate route name '{0}'")]
    DuplicateRoute(String),

    #[error("route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.upstream.base_url.as_deref() {
        None => errors.push(ValidationError::MissingUpstream),
        Some(url) if url.trim().is_empty() => errors.push(ValidationError::MissingUpstream),
        Some(url) => {
            if let Err(e) = UpstreamBase::parse(url) {
                errors.push(ValidationError::InvalidUpstream {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
            continue;
        }
        if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        validate_route(route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    let mut invalid = |reason: String| {
        errors.push(ValidationError::InvalidRoute {
            route: route.name.clone(),
            reason,
        })
    };

    if route.methods.is_empty() {
        invalid("no methods configured".to_string());
    }
    for m in route.methods.iter().chain(route.upstream_method.iter()) {
        if let Err(reason) = parse_method(m) {
            invalid(reason);
        }
    }

    let pattern = match PathPattern::parse(&route.path) {
        Ok(p) => p,
        Err(reason) => {
            invalid(format!("path: {}", reason));
            return;
        }
    };

    if !route.upstream.starts_with('/') {
        invalid(format!("upstream template '{}' must start with '/'", route.upstream));
        return;
    }

    match PathPattern::placeholders(&route.upstream) {
        Ok(names) => {
            for name in names {
                if !pattern.has_param(&name) {
                    invalid(format!("upstream placeholder '{{{}}}' not bound by path", name));
                }
            }
        }
        Err(reason) => invalid(format!("upstream: {}", reason)),
    }
}
