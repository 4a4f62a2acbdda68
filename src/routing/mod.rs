//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → router.rs (rule lookup)
//!     → matcher.rs (segment match, parameter capture)
//!     → Return: ResolvedRoute (upstream method + path) or a miss
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile patterns and methods
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use router::{ResolvedRoute, RouteMatch, Router};
