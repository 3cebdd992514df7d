//! Declarative route descriptors.
//!
//! A route tree has [`EndpointRoute`] leaves and [`GroupRoute`] internal
//! nodes. Descriptors deserialize from JSON or TOML; resolved handlers and
//! middleware can also be attached directly when routes are built in code.
//!
//! ```json
//! {"type": "group", "middleware_names": ["request-id"], "endpoints": [
//!     {"name": "ping", "method": "GET", "pattern": "/ping", "handler_name": "ping"}
//! ]}
//! ```

use std::time::Duration;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::http::{Handler, Middleware};

/// A node of the route tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteDescriptor {
    Endpoint(EndpointRoute),
    Group(GroupRoute),
}

impl From<EndpointRoute> for RouteDescriptor {
    fn from(endpoint: EndpointRoute) -> Self {
        RouteDescriptor::Endpoint(endpoint)
    }
}

impl From<GroupRoute> for RouteDescriptor {
    fn from(group: GroupRoute) -> Self {
        RouteDescriptor::Group(group)
    }
}

/// Binds a method and URL pattern to one handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRoute {
    /// Label used in logs and errors.
    pub name: String,

    #[serde(with = "method_serde")]
    pub method: Method,

    /// Appended to the router's base path.
    pub pattern: String,

    /// Match every path below `pattern` instead of `pattern` alone.
    #[serde(default)]
    pub path_prefix: bool,

    /// Zero inherits the router default.
    #[serde(default)]
    pub timeout_ms: u64,

    /// Resolved through the registry when `handler` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_name: Option<String>,

    #[serde(skip)]
    pub handler: Option<Handler>,
}

impl EndpointRoute {
    pub fn new(name: impl Into<String>, method: Method, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            pattern: pattern.into(),
            path_prefix: false,
            timeout_ms: 0,
            handler_name: None,
            handler: None,
        }
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn handler_name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = Some(name.into());
        self
    }

    pub fn path_prefix(mut self) -> Self {
        self.path_prefix = true;
        self
    }

    /// Partial milliseconds round up, so only `Duration::ZERO` falls back to
    /// the router default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }
}

/// Supplies inherited middleware to every endpoint beneath it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRoute {
    #[serde(default)]
    pub endpoints: Vec<EndpointRoute>,

    #[serde(default)]
    pub sub_routes: Vec<GroupRoute>,

    /// Resolved through the registry when `middleware` is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware_names: Vec<String>,

    #[serde(skip)]
    pub middleware: Vec<Middleware>,
}

impl GroupRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: EndpointRoute) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn sub_route(mut self, group: GroupRoute) -> Self {
        self.sub_routes.push(group);
        self
    }

    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn middleware_name(mut self, name: impl Into<String>) -> Self {
        self.middleware_names.push(name.into());
        self
    }
}

mod method_serde {
    use axum::http::Method;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(D::Error::custom)
    }
}
