//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit)
//!     → routing (resolve forwarding rule)
//!     → forward.rs (build upstream URL, issue upstream call)
//!         → request.rs (copy headers, relay cookie, buffer body)
//!         → response.rs (JSON/text framing, Set-Cookie relay)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder, UpstreamBase};
pub use server::{HttpServer, StartupError};
