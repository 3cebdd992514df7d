//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteDescriptor tree + Registry
//!     → builder.rs (resolve names, compose middleware, wrap timeouts)
//!     → dispatch.rs (immutable DispatchTable)
//!
//! Incoming Request:
//!     → axum path matcher (method + path)
//!     → inherited middleware chain → endpoint handler
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Configuration defects fail the build, never a request
//! - Deterministic: declaration order is traversal order

pub mod builder;
pub mod descriptor;
pub mod dispatch;

pub use builder::{BuildError, RouterBuilder, RouterOptions};
pub use descriptor::{EndpointRoute, GroupRoute, RouteDescriptor};
pub use dispatch::{DispatchEntry, DispatchTable, MatchKind};
