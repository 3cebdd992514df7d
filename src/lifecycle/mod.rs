//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal resolves
//!     → HttpServer::stop(grace): stop accepting, drain, release listener
//! ```
//!
//! # Design Decisions
//! - The server never listens for OS signals itself; it is handed a
//!   cancellation signal
//! - Shutdown has a deadline: in-flight requests are cut after the grace

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::{forward_signals, shutdown_signal};
