//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the `request-id` middleware and the access log
//! - Handler panics are logged once, with their backtrace, where caught

pub mod logging;

pub use logging::{init, LoggingError};
