//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server setup, connection timeouts, lifecycle)
//!     → dispatcher.rs (global middleware, panic recovery, write deadline)
//!     → dispatch router (per-route middleware chain → handler)
//!     → response.rs helpers build the body
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod handler;
pub mod response;
pub mod server;

pub use dispatcher::{DispatchError, Dispatcher};
pub use handler::{chain, BoxResponseFuture, Handler, Middleware, Next};
pub use response::{respond_bytes, respond_json, respond_message, Message};
pub use server::{HttpServer, ServerError, ServerState};
