//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to an endpoint with a timeout:
//!     → timeouts.rs (race the guarded handler against the deadline)
//!     → panic.rs (isolate panics, capture the backtrace once)
//!     → Outcome: Success | Timeout | Aborted
//! ```
//!
//! # Design Decisions
//! - Timeouts are opt-in per endpoint; zero means no wrapper at all
//! - A panic is logged where it is caught and never again
//! - Timed-out requests get a deterministic status and message

pub mod panic;
pub mod timeouts;

pub use timeouts::{Aborted, Outcome, TimeoutPolicy};
