//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection (accepted by axum-server)
//!     → idle.rs (keep-alive timeout between requests)
//!     → tls.rs (optional TLS handshake via rustls)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - The idle timer sits beneath TLS so handshakes count as activity
//! - TLS is optional and handled transparently

pub mod idle;
pub mod tls;

pub use idle::{Activity, ActivityService, IdleStream, IdleTimeoutAcceptor};
pub use tls::load_tls_config;
