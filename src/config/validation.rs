//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout status, paths)
//! - Check that optional sections are complete when present
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route names are not checked here; they are resolved when the dispatch
//!   table is built

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.name must not be empty")]
    MissingServerName,

    #[error("server.tls.{0} must not be empty")]
    IncompleteTls(&'static str),

    #[error("router.timeout_status {0} is not a valid HTTP status")]
    InvalidTimeoutStatus(u16),

    #[error("router.base_path `{0}` must start with `/`")]
    InvalidBasePath(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if let Some(tls) = &config.server.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::IncompleteTls("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::IncompleteTls("key_path"));
        }
    }

    let status = config.router.timeout_status;
    if StatusCode::from_u16(status).is_err() {
        errors.push(ValidationError::InvalidTimeoutStatus(status));
    }

    let base_path = &config.router.base_path;
    if !base_path.is_empty() && !base_path.starts_with('/') {
        errors.push(ValidationError::InvalidBasePath(base_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
