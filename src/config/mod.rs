//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch.toml (+ optional dispatch.local.toml)
//!     → loader.rs (parse, deep merge, deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, LogFormat, ObservabilityConfig, RouterConfig, ServerConfig, ServerTimeoutConfig,
    ShutdownConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
