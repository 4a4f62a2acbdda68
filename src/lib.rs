//! Admin gateway library.
//!
//! Forwards the admin panel's `/api/...` calls to the upstream API, relaying
//! cookies both ways and re-framing JSON and text responses.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
