//! Compiles a route descriptor tree into a [`DispatchTable`].
//!
//! # Responsibilities
//! - Walk the tree depth-first in declaration order
//! - Resolve handler and middleware names through the [`Registry`]
//! - Compose inherited middleware chains (parent groups outermost)
//! - Apply the timeout wrapper where an effective timeout exists
//! - Register each endpoint by (method, base path + pattern)
//!
//! # Design Decisions
//! - Every resolution failure is a build error; nothing is deferred to
//!   request time
//! - Overlap between registrations is left to axum's path matcher: static
//!   segments beat `{param}` segments, which beat `{*wildcard}` tails.
//!   Patterns axum refuses, such as `/{a}` next to `/{b}`, are reported as
//!   [`BuildError::InvalidPattern`]
//! - A prefix registration covers its pattern and everything below it on a
//!   segment boundary; an exact registration of the same path wins

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use thiserror::Error;

use crate::config::RouterConfig;
use crate::http::response::respond_message;
use crate::http::{chain, Handler, Middleware};
use crate::registry::{Registry, ResolveError};
use crate::resilience::panic;
use crate::resilience::timeouts::{self, TimeoutPolicy, DEFAULT_TIMEOUT_MESSAGE, DEFAULT_TIMEOUT_STATUS};
use crate::routing::descriptor::{EndpointRoute, GroupRoute, RouteDescriptor};
use crate::routing::dispatch::{DispatchEntry, DispatchTable, MatchKind};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing handler of route `{route}`")]
    MissingHandler { route: String },

    #[error("route `{route}`: {source}")]
    Handler {
        route: String,
        #[source]
        source: ResolveError,
    },

    #[error("{0}")]
    Middleware(#[source] ResolveError),

    #[error("route `{route}`: invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        route: String,
        pattern: String,
        reason: String,
    },

    #[error("route `{route}`: method {method} cannot be routed")]
    UnsupportedMethod { route: String, method: Method },

    #[error("route `{route}`: {method} {pattern} is already registered")]
    DuplicateRoute {
        route: String,
        method: Method,
        pattern: String,
    },
}

/// Router-wide settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Prepended to every endpoint pattern.
    pub base_path: String,
    /// Applied to endpoints without their own timeout; zero disables.
    pub default_timeout: Duration,
    pub timeout_message: String,
    pub timeout_status: StatusCode,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            default_timeout: Duration::ZERO,
            timeout_message: DEFAULT_TIMEOUT_MESSAGE.to_string(),
            timeout_status: DEFAULT_TIMEOUT_STATUS,
        }
    }
}

impl From<&RouterConfig> for RouterOptions {
    fn from(config: &RouterConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
            default_timeout: Duration::from_millis(config.request_timeout_ms),
            timeout_message: config.timeout_message.clone(),
            timeout_status: StatusCode::from_u16(config.timeout_status)
                .unwrap_or(DEFAULT_TIMEOUT_STATUS),
        }
    }
}

/// Builds dispatch tables against a frozen registry.
pub struct RouterBuilder<'a> {
    registry: &'a Registry,
    options: RouterOptions,
    middleware: Vec<Middleware>,
}

impl<'a> RouterBuilder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            options: RouterOptions::default(),
            middleware: Vec::new(),
        }
    }

    pub fn options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.options.base_path = base_path.into();
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.options.default_timeout = timeout;
        self
    }

    pub fn timeout_message(mut self, message: impl Into<String>) -> Self {
        self.options.timeout_message = message.into();
        self
    }

    pub fn timeout_status(mut self, status: StatusCode) -> Self {
        self.options.timeout_status = status;
        self
    }

    /// Base middleware, inherited by every route.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn build(&self, routes: &[RouteDescriptor]) -> Result<DispatchTable, BuildError> {
        let message = if self.options.timeout_message.is_empty() {
            DEFAULT_TIMEOUT_MESSAGE
        } else {
            self.options.timeout_message.as_str()
        };
        let mut compiler = Compiler {
            registry: self.registry,
            options: &self.options,
            timeout_message: message.into(),
            seen: HashSet::new(),
            mounts: BTreeMap::new(),
            entries: Vec::new(),
        };
        for route in routes {
            compiler.visit(route, &self.middleware)?;
        }

        let table = compiler.finish()?;
        tracing::info!(
            routes = table.entries().len(),
            base_path = %self.options.base_path,
            "Dispatch table built"
        );
        Ok(table)
    }
}

struct Mount {
    route: String,
    kind: MatchKind,
    filter: MethodFilter,
    handler: Handler,
}

struct Compiler<'a> {
    registry: &'a Registry,
    options: &'a RouterOptions,
    timeout_message: Arc<str>,
    seen: HashSet<(Method, MatchKind, String)>,
    mounts: BTreeMap<String, HashMap<Method, Mount>>,
    entries: Vec<DispatchEntry>,
}

impl Compiler<'_> {
    fn visit(&mut self, route: &RouteDescriptor, inherited: &[Middleware]) -> Result<(), BuildError> {
        match route {
            RouteDescriptor::Endpoint(endpoint) => self.endpoint(endpoint, inherited),
            RouteDescriptor::Group(group) => self.group(group, inherited),
        }
    }

    fn group(&mut self, group: &GroupRoute, inherited: &[Middleware]) -> Result<(), BuildError> {
        let own = if group.middleware.is_empty() {
            group
                .middleware_names
                .iter()
                .map(|name| self.registry.resolve_middleware(name))
                .collect::<Result<Vec<_>, _>>()
                .map_err(BuildError::Middleware)?
        } else {
            group.middleware.clone()
        };

        let mut effective = Vec::with_capacity(inherited.len() + own.len());
        effective.extend_from_slice(inherited);
        effective.extend(own);

        for endpoint in &group.endpoints {
            self.endpoint(endpoint, &effective)?;
        }
        for sub_route in &group.sub_routes {
            self.group(sub_route, &effective)?;
        }
        Ok(())
    }

    fn endpoint(&mut self, endpoint: &EndpointRoute, inherited: &[Middleware]) -> Result<(), BuildError> {
        let handler = match (&endpoint.handler, &endpoint.handler_name) {
            (Some(handler), _) => handler.clone(),
            (None, Some(name)) => self.registry.resolve_handler(name).map_err(|source| {
                BuildError::Handler {
                    route: endpoint.name.clone(),
                    source,
                }
            })?,
            (None, None) => {
                return Err(BuildError::MissingHandler {
                    route: endpoint.name.clone(),
                })
            }
        };

        let timeout = [
            Duration::from_millis(endpoint.timeout_ms),
            self.options.default_timeout,
        ]
        .into_iter()
        .find(|d| !d.is_zero());

        let handler = match timeout {
            Some(duration) => timeouts::with_timeout(
                handler,
                endpoint.name.as_str(),
                TimeoutPolicy {
                    duration,
                    status: self.options.timeout_status,
                    message: Arc::clone(&self.timeout_message),
                },
            ),
            None => handler,
        };

        let pattern = format!("{}{}", self.options.base_path, endpoint.pattern);
        if let Err(reason) = check_pattern(&pattern, endpoint.path_prefix) {
            return Err(BuildError::InvalidPattern {
                route: endpoint.name.clone(),
                pattern,
                reason: reason.to_string(),
            });
        }
        let filter = MethodFilter::try_from(endpoint.method.clone()).map_err(|_| {
            BuildError::UnsupportedMethod {
                route: endpoint.name.clone(),
                method: endpoint.method.clone(),
            }
        })?;

        let kind = if endpoint.path_prefix {
            MatchKind::Prefix
        } else {
            MatchKind::Exact
        };
        let key = match kind {
            MatchKind::Exact => pattern.clone(),
            MatchKind::Prefix => pattern.trim_end_matches('/').to_string(),
        };
        if !self.seen.insert((endpoint.method.clone(), kind, key)) {
            return Err(BuildError::DuplicateRoute {
                route: endpoint.name.clone(),
                method: endpoint.method.clone(),
                pattern,
            });
        }

        let composed = chain(inherited.to_vec(), handler);
        match kind {
            MatchKind::Exact => self.mount(pattern.clone(), endpoint, filter, kind, composed),
            MatchKind::Prefix => {
                let root = pattern.trim_end_matches('/');
                let base = if root.is_empty() { "/" } else { root };
                let below = format!("{root}/{{*rest}}");
                self.mount(base.to_string(), endpoint, filter, kind, composed.clone());
                self.mount(below, endpoint, filter, kind, composed);
            }
        }

        tracing::debug!(
            route = %endpoint.name,
            method = %endpoint.method,
            pattern = %pattern,
            match_kind = ?kind,
            middleware = inherited.len(),
            timeout_ms = timeout.map(|d| d.as_millis() as u64),
            "Route registered"
        );
        self.entries.push(DispatchEntry {
            name: endpoint.name.clone(),
            method: endpoint.method.clone(),
            pattern,
            match_kind: kind,
            middleware_len: inherited.len(),
            timeout,
        });
        Ok(())
    }

    fn mount(
        &mut self,
        path: String,
        endpoint: &EndpointRoute,
        filter: MethodFilter,
        kind: MatchKind,
        handler: Handler,
    ) {
        let methods = self.mounts.entry(path).or_default();
        if let Some(existing) = methods.get(&endpoint.method) {
            if existing.kind == MatchKind::Exact && kind == MatchKind::Prefix {
                return;
            }
        }
        let mount = Mount {
            route: endpoint.name.clone(),
            kind,
            filter,
            handler,
        };
        methods.insert(endpoint.method.clone(), mount);
    }

    fn finish(self) -> Result<DispatchTable, BuildError> {
        let mut router = Router::new();
        for (path, methods) in self.mounts {
            let mut names: Vec<String> = methods.values().map(|mount| mount.route.clone()).collect();
            names.sort();
            names.dedup();

            let mut method_router: MethodRouter = MethodRouter::new();
            for mount in methods.into_values() {
                let handler = mount.handler;
                method_router = method_router.on(mount.filter, move |req: Request| handler.call(req));
            }
            // axum panics on patterns its matcher refuses.
            router = panic::catch(|| router.route(&path, method_router)).map_err(|report| {
                BuildError::InvalidPattern {
                    route: names.join(", "),
                    pattern: path.clone(),
                    reason: report.message,
                }
            })?;
        }
        Ok(DispatchTable::new(router.fallback(not_found), self.entries))
    }
}

/// Rejects what axum's router would otherwise panic on.
fn check_pattern(pattern: &str, prefix: bool) -> Result<(), &'static str> {
    if !pattern.starts_with('/') {
        return Err("must start with `/`");
    }
    if prefix && pattern.contains("{*") {
        return Err("a prefix route already captures the rest of the path");
    }
    if pattern.split('/').any(|segment| segment.starts_with(':') || segment.starts_with('*')) {
        return Err("use `{param}` and `{*rest}` captures");
    }
    Ok(())
}

async fn not_found() -> Response {
    respond_message(StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Next;
    use crate::registry::Kind;
    use axum::body::Body;
    use axum::response::IntoResponse;
    use std::sync::Mutex;
    use tower::ServiceExt;

    type CallLog = Arc<Mutex<Vec<String>>>;

    fn text(body: &'static str) -> Handler {
        Handler::new(move |_req| async move { body.into_response() })
    }

    fn recording(label: &str, log: CallLog) -> Middleware {
        let label = label.to_string();
        Middleware::from_fn(move |req, next: Next| {
            let log = log.clone();
            let label = label.clone();
            async move {
                log.lock().unwrap().push(label);
                next.run(req).await
            }
        })
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn ping_scenario() {
        let registry = Registry::builder().build();
        let routes = vec![EndpointRoute::new("ping", Method::GET, "/ping")
            .handler(text("ok"))
            .into()];

        let table = RouterBuilder::new(&registry).base_path("").build(&routes).unwrap();

        assert_eq!(send(table.router(), Method::GET, "/ping").await, (StatusCode::OK, "ok".into()));
        let (status, _) = send(table.router(), Method::GET, "/pingx").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(table.router(), Method::POST, "/ping").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn nested_group_middleware_order() {
        let log: CallLog = Arc::default();
        let handler_log = log.clone();
        let registry = Registry::builder()
            .middleware("A", recording("A", log.clone()))
            .unwrap()
            .middleware("B", recording("B", log.clone()))
            .unwrap()
            .handler(
                "leaf",
                Handler::new(move |_req| {
                    let log = handler_log.clone();
                    async move {
                        log.lock().unwrap().push("handler".into());
                        "leaf".into_response()
                    }
                }),
            )
            .unwrap()
            .build();

        let routes = vec![GroupRoute::new()
            .middleware_name("A")
            .sub_route(
                GroupRoute::new()
                    .middleware_name("B")
                    .endpoint(EndpointRoute::new("leaf", Method::GET, "/leaf").handler_name("leaf")),
            )
            .into()];

        let table = RouterBuilder::new(&registry).build(&routes).unwrap();
        assert_eq!(table.entries()[0].middleware_len, 2);

        let (status, _) = send(table.router(), Method::GET, "/leaf").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "handler"]);
    }

    #[tokio::test]
    async fn base_middleware_is_outermost() {
        let log: CallLog = Arc::default();
        let registry = Registry::builder().build();
        let routes = vec![GroupRoute::new()
            .middleware(recording("group", log.clone()))
            .endpoint(EndpointRoute::new("x", Method::GET, "/x").handler(text("x")))
            .into()];

        let table = RouterBuilder::new(&registry)
            .middleware(recording("base", log.clone()))
            .build(&routes)
            .unwrap();
        send(table.router(), Method::GET, "/x").await;
        assert_eq!(*log.lock().unwrap(), vec!["base", "group"]);
    }

    #[tokio::test]
    async fn resolved_handler_skips_the_registry() {
        // Nothing is registered, so any lookup would fail the build.
        let registry = Registry::builder().build();
        let routes = vec![GroupRoute::new()
            .middleware(Middleware::from_fn(|req, next: Next| next.run(req)))
            .middleware_name("unregistered")
            .endpoint(
                EndpointRoute::new("direct", Method::GET, "/direct")
                    .handler(text("direct"))
                    .handler_name("unregistered"),
            )
            .into()];

        let table = RouterBuilder::new(&registry).build(&routes).unwrap();
        assert_eq!(
            send(table.router(), Method::GET, "/direct").await,
            (StatusCode::OK, "direct".into())
        );
    }

    #[tokio::test]
    async fn factory_builds_handler_from_arguments() {
        let registry = Registry::builder()
            .handler_factory("echo", |_family: &str, args: &[String]| -> Result<Handler, crate::registry::FactoryError> {
                let joined = args.join("|");
                Ok(Handler::new(move |_req| {
                    let joined = joined.clone();
                    async move { joined.into_response() }
                }))
            })
            .unwrap()
            .build();
        let routes = vec![EndpointRoute::new("echo", Method::GET, "/echo")
            .handler_name("echo:a;b:c")
            .into()];

        let table = RouterBuilder::new(&registry).build(&routes).unwrap();
        assert_eq!(
            send(table.router(), Method::GET, "/echo").await,
            (StatusCode::OK, "a|b:c".into())
        );
    }

    #[test]
    fn unresolved_handler_fails_the_build() {
        let registry = Registry::builder().build();
        let routes = vec![EndpointRoute::new("ghost", Method::GET, "/ghost")
            .handler_name("ghost")
            .into()];

        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Handler { ref route, source: ResolveError::NotFound { kind: Kind::Handler, .. } } if route == "ghost"
        ));
    }

    #[test]
    fn unresolved_middleware_fails_the_build() {
        let registry = Registry::builder().build();
        let routes = vec![GroupRoute::new()
            .middleware_name("auth:admin")
            .endpoint(EndpointRoute::new("x", Method::GET, "/x").handler(text("x")))
            .into()];

        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert_eq!(err.to_string(), "no middleware registered for `auth:admin`");
    }

    #[test]
    fn endpoint_without_any_handler_fails() {
        let registry = Registry::builder().build();
        let routes = vec![EndpointRoute::new("empty", Method::GET, "/empty").into()];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert!(matches!(err, BuildError::MissingHandler { .. }));
    }

    #[test]
    fn pattern_must_be_absolute() {
        let registry = Registry::builder().build();
        let routes = vec![EndpointRoute::new("rel", Method::GET, "relative").handler(text("x")).into()];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert!(matches!(err, BuildError::InvalidPattern { .. }));

        let routes = vec![EndpointRoute::new("legacy", Method::GET, "/users/:id").handler(text("x")).into()];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "route `legacy`: invalid pattern `/users/:id`: use `{param}` and `{*rest}` captures"
        );
    }

    #[test]
    fn patterns_axum_refuses_are_build_errors() {
        let registry = Registry::builder().build();
        let routes = vec![
            EndpointRoute::new("by-id", Method::GET, "/u/{id}").handler(text("id")).into(),
            EndpointRoute::new("by-name", Method::GET, "/u/{name}").handler(text("name")).into(),
        ];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        match err {
            BuildError::InvalidPattern { route, pattern, reason } => {
                assert!(route == "by-id" || route == "by-name");
                assert!(pattern.starts_with("/u/{"));
                assert!(reason.contains("conflict"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let routes = vec![EndpointRoute::new("open", Method::GET, "/a{").handler(text("x")).into()];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert!(matches!(err, BuildError::InvalidPattern { ref route, .. } if route == "open"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Registry::builder().build();
        let routes = vec![
            EndpointRoute::new("one", Method::GET, "/same").handler(text("1")).into(),
            EndpointRoute::new("two", Method::GET, "/same").handler(text("2")).into(),
        ];
        let err = RouterBuilder::new(&registry).build(&routes).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateRoute { ref route, .. } if route == "two"));
    }

    #[tokio::test]
    async fn methods_share_a_path() {
        let registry = Registry::builder().build();
        let routes = vec![
            EndpointRoute::new("read", Method::GET, "/item").handler(text("read")).into(),
            EndpointRoute::new("write", Method::PUT, "/item").handler(text("write")).into(),
        ];
        let table = RouterBuilder::new(&registry).build(&routes).unwrap();
        assert_eq!(send(table.router(), Method::GET, "/item").await.1, "read");
        assert_eq!(send(table.router(), Method::PUT, "/item").await.1, "write");
    }

    #[tokio::test]
    async fn prefix_and_exact_registrations_coexist() {
        let registry = Registry::builder().build();
        let routes = vec![
            EndpointRoute::new("assets", Method::GET, "/assets").path_prefix().handler(text("prefix")).into(),
            EndpointRoute::new("special", Method::GET, "/assets/special").handler(text("exact")).into(),
            EndpointRoute::new("root", Method::GET, "/assets").handler(text("root")).into(),
        ];
        let table = RouterBuilder::new(&registry).base_path("/v1").build(&routes).unwrap();

        let router = table.router();
        assert_eq!(send(router.clone(), Method::GET, "/v1/assets/css/site.css").await.1, "prefix");
        assert_eq!(send(router.clone(), Method::GET, "/v1/assets/special").await.1, "exact");
        assert_eq!(send(router.clone(), Method::GET, "/v1/assets").await.1, "root");
        assert_eq!(send(router, Method::GET, "/v1/assetsx").await.0, StatusCode::NOT_FOUND);

        let kinds: Vec<_> = table.entries().iter().map(|e| (e.pattern.as_str(), e.match_kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("/v1/assets", MatchKind::Prefix),
                ("/v1/assets/special", MatchKind::Exact),
                ("/v1/assets", MatchKind::Exact),
            ]
        );
    }

    #[tokio::test]
    async fn unset_timeouts_apply_no_wrapper() {
        let registry = Registry::builder().build();
        let routes = vec![EndpointRoute::new("forever", Method::GET, "/forever")
            .handler(Handler::new(|_req| std::future::pending()))
            .into()];

        let table = RouterBuilder::new(&registry).build(&routes).unwrap();
        assert_eq!(table.entries()[0].timeout, None);

        let req = Request::builder().uri("/forever").body(Body::empty()).unwrap();
        let pending = tokio::time::timeout(Duration::from_millis(100), table.router().oneshot(req)).await;
        assert!(pending.is_err(), "nothing in the router may interrupt the handler");
    }

    #[tokio::test]
    async fn effective_timeout_resolution() {
        let registry = Registry::builder().build();
        let slow = Handler::new(|_req| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "slow".into_response()
        });
        let routes = vec![
            EndpointRoute::new("inherits", Method::GET, "/inherits").handler(slow.clone()).into(),
            EndpointRoute::new("own", Method::GET, "/own")
                .handler(slow)
                .timeout(Duration::from_secs(5))
                .into(),
        ];

        let table = RouterBuilder::new(&registry)
            .default_timeout(Duration::from_millis(20))
            .timeout_message("")
            .build(&routes)
            .unwrap();
        assert_eq!(table.entries()[0].timeout, Some(Duration::from_millis(20)));
        assert_eq!(table.entries()[1].timeout, Some(Duration::from_secs(5)));

        assert_eq!(
            send(table.router(), Method::GET, "/inherits").await,
            (StatusCode::SERVICE_UNAVAILABLE, "request timeout".into())
        );
        assert_eq!(send(table.router(), Method::GET, "/own").await, (StatusCode::OK, "slow".into()));
    }

    #[test]
    fn serialized_tree_rebuilds_to_same_signature() {
        let statics = || {
            Registry::builder()
                .handler("a", text("a"))
                .unwrap()
                .handler("b", text("b"))
                .unwrap()
                .middleware("m1", Middleware::from_fn(|req, next: Next| next.run(req)))
                .unwrap()
                .middleware("m2", Middleware::from_fn(|req, next: Next| next.run(req)))
                .unwrap()
                .build()
        };
        let tree: RouteDescriptor = GroupRoute::new()
            .middleware_name("m1")
            .endpoint(EndpointRoute::new("a", Method::GET, "/a").handler_name("a"))
            .sub_route(
                GroupRoute::new()
                    .middleware_name("m2")
                    .endpoint(EndpointRoute::new("b", Method::POST, "/b").path_prefix().handler_name("b")),
            )
            .into();

        let first = RouterBuilder::new(&statics()).build(&[tree.clone()]).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: RouteDescriptor = serde_json::from_str(&json).unwrap();
        let second = RouterBuilder::new(&statics()).build(&[restored]).unwrap();

        assert_eq!(first.signature(), second.signature());
        assert_eq!(
            first.signature().into_iter().map(|(m, p, _, len)| (m, p, len)).collect::<Vec<_>>(),
            vec![("GET".into(), "/a".into(), 1), ("POST".into(), "/b".into(), 2)]
        );
    }
}
