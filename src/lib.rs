//! Declarative HTTP dispatch.
//!
//! A tree of route descriptors plus a frozen name registry compiles into an
//! immutable dispatch table, which an [`HttpServer`] serves until stopped.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod registry;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub mod builtins;

pub use config::AppConfig;
pub use http::{Handler, HttpServer, Middleware};
pub use lifecycle::Shutdown;
pub use registry::Registry;
pub use routing::{RouteDescriptor, RouterBuilder};
