//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatcher. All types derive Serde traits for deserialization from config
//! files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::RouteDescriptor;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listening socket and transport settings.
    pub server: ServerConfig,

    /// Router-wide defaults.
    pub router: RouterConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Shutdown behavior.
    pub shutdown: ShutdownConfig,

    /// Route descriptor tree, in declaration order.
    pub routes: Vec<RouteDescriptor>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Identifies the server in logs. Required.
    pub name: String,

    pub host: String,

    /// Zero picks an ephemeral port.
    pub port: u16,

    /// Serve over TLS when set.
    pub tls: Option<TlsConfig>,

    pub timeouts: ServerTimeoutConfig,

    /// Middleware names wrapped around the whole router, outermost first.
    pub global_middleware: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            tls: None,
            timeouts: ServerTimeoutConfig::default(),
            global_middleware: Vec::new(),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Connection-level timeouts in seconds. Zero selects the default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerTimeoutConfig {
    /// Reading the whole request body.
    pub read_secs: u64,

    /// Reading the request head.
    pub read_header_secs: u64,

    /// Producing the response.
    pub write_secs: u64,

    /// Keep-alive inactivity.
    pub idle_secs: u64,
}

const DEFAULT_READ: Duration = Duration::from_secs(15);
const DEFAULT_READ_HEADER: Duration = Duration::from_secs(15);
const DEFAULT_WRITE: Duration = Duration::from_secs(15);
const DEFAULT_IDLE: Duration = Duration::from_secs(60);

fn or_default(secs: u64, default: Duration) -> Duration {
    if secs == 0 {
        default
    } else {
        Duration::from_secs(secs)
    }
}

impl ServerTimeoutConfig {
    pub fn read(&self) -> Duration {
        or_default(self.read_secs, DEFAULT_READ)
    }

    pub fn read_header(&self) -> Duration {
        or_default(self.read_header_secs, DEFAULT_READ_HEADER)
    }

    pub fn write(&self) -> Duration {
        or_default(self.write_secs, DEFAULT_WRITE)
    }

    pub fn idle(&self) -> Duration {
        or_default(self.idle_secs, DEFAULT_IDLE)
    }
}

/// Router-wide defaults applied while building the dispatch table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prepended to every endpoint pattern.
    pub base_path: String,

    /// Default per-request timeout in milliseconds (0 = none).
    pub request_timeout_ms: u64,

    /// Body written on timeout.
    pub timeout_message: String,

    /// Status written on timeout.
    pub timeout_status: u16,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            request_timeout_ms: 0,
            timeout_message: "request timeout".to_string(),
            timeout_status: 503,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight requests may take to finish after a stop signal.
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_secs: 10 }
    }
}

impl ShutdownConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}
