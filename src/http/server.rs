//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Own the listening socket (plain or TLS)
//! - Configure HTTP/1.1 and HTTP/2 support and connection timeouts
//! - Wire up server-wide layers (tracing, body timeout, global middleware)
//! - Serve a [`DispatchTable`] until stopped, then drain under a deadline
//!
//! # States
//! ```text
//! Idle → Preparing → Running → Draining → Stopped
//!   └──────────── stop() before run() ───────↗
//! ```
//!
//! # Timeouts
//! - read-header: hyper's HTTP/1 header read timeout
//! - read: request body timeout
//! - write: deadline on producing the response; exceeded closes the
//!   connection without a response
//! - idle: keep-alive wait on a connection with no request in progress

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::accept::DefaultAcceptor;
use axum_server::tls_rustls::RustlsAcceptor;
use axum_server::Handle;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use thiserror::Error;
use tokio::sync::watch;
use tower::make::Shared;
use tower_http::timeout::RequestBodyTimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::dispatcher::Dispatcher;
use crate::http::Middleware;
use crate::lifecycle::ShutdownSignal;
use crate::net::{load_tls_config, IdleTimeoutAcceptor};
use crate::routing::DispatchTable;

/// Extra time granted after the grace period for the listener to let go.
const RELEASE_MARGIN: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    /// Resolving the address and transport security.
    Preparing,
    /// Socket bound, accepting connections.
    Running,
    /// Not accepting; waiting for in-flight requests.
    Draining,
    Stopped,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server name must not be empty")]
    MissingName,

    #[error("server `{name}` cannot start: already {state:?}")]
    AlreadyStarted { name: String, state: ServerState },

    #[error("cannot resolve listen address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] io::Error),

    #[error("listener failed: {0}")]
    Serve(#[source] io::Error),

    #[error("listener not released within {0:?}")]
    Shutdown(Duration),
}

/// HTTP server for a dispatch table.
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    routes: usize,
    global_middleware: Vec<Middleware>,
    handle: Handle,
    state: watch::Sender<ServerState>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, table: DispatchTable) -> Result<Self, ServerError> {
        if config.name.trim().is_empty() {
            return Err(ServerError::MissingName);
        }
        let routes = table.entries().len();
        let (state, _) = watch::channel(ServerState::Idle);
        Ok(Self {
            config: config.clone(),
            router: table.into_router(),
            routes,
            global_middleware: Vec::new(),
            handle: Handle::new(),
            state,
        })
    }

    /// Middleware wrapped around the whole router, outermost first.
    pub fn with_global_middleware(mut self, middleware: Vec<Middleware>) -> Self {
        self.global_middleware = middleware;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Resolves to the bound address once the socket is listening, or
    /// `None` if the server stopped before binding.
    pub async fn listening(&self) -> Option<SocketAddr> {
        self.handle.listening().await
    }

    /// Serve until stopped. Only the first call starts the server.
    pub async fn run(&self) -> Result<(), ServerError> {
        let mut previous = ServerState::Idle;
        let claimed = self.state.send_if_modified(|state| {
            previous = *state;
            if *state == ServerState::Idle {
                *state = ServerState::Preparing;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ServerError::AlreadyStarted {
                name: self.config.name.clone(),
                state: previous,
            });
        }
        tracing::info!(server = %self.config.name, routes = self.routes, "Server preparing");

        let result = self.serve().await;
        self.state.send_replace(ServerState::Stopped);
        match &result {
            Ok(()) => tracing::info!(server = %self.config.name, "HTTP server stopped"),
            Err(e) => tracing::error!(server = %self.config.name, error = %e, "HTTP server failed"),
        }
        result
    }

    async fn serve(&self) -> Result<(), ServerError> {
        let addr = self.resolve_address().await?;
        let timeouts = &self.config.timeouts;
        let make_service = Shared::new(self.dispatcher());
        let idle = IdleTimeoutAcceptor::new(DefaultAcceptor::new(), timeouts.idle());

        let serving = async {
            match &self.config.tls {
                Some(tls) => {
                    let rustls = load_tls_config(tls).await.map_err(ServerError::Tls)?;
                    let acceptor = RustlsAcceptor::new(rustls).acceptor(idle);
                    let mut server = axum_server::bind(addr)
                        .acceptor(acceptor)
                        .handle(self.handle.clone());
                    configure_http(server.http_builder(), timeouts.read_header());
                    server.serve(make_service).await.map_err(ServerError::Serve)
                }
                None => {
                    let mut server = axum_server::bind(addr)
                        .acceptor(idle)
                        .handle(self.handle.clone());
                    configure_http(server.http_builder(), timeouts.read_header());
                    server.serve(make_service).await.map_err(ServerError::Serve)
                }
            }
        };
        tokio::pin!(serving);

        tokio::select! {
            result = &mut serving => result,
            bound = self.handle.listening() => {
                if let Some(local) = bound {
                    self.mark_running(local);
                }
                serving.await
            }
        }
    }

    fn mark_running(&self, local: SocketAddr) {
        let promoted = self.state.send_if_modified(|state| {
            if *state == ServerState::Preparing {
                *state = ServerState::Running;
                true
            } else {
                false
            }
        });
        if promoted {
            tracing::info!(
                server = %self.config.name,
                address = %local,
                tls = self.config.tls.is_some(),
                "HTTP server listening"
            );
        }
    }

    /// Stop accepting, let in-flight requests finish within `grace`, then
    /// wait for the listener to be released.
    ///
    /// A listener that is still held after `grace` plus a short margin is
    /// reported as [`ServerError::Shutdown`]; the caller decides whether
    /// that is fatal.
    pub async fn stop(&self, grace: Duration) -> Result<(), ServerError> {
        let mut previous = ServerState::Idle;
        self.state.send_if_modified(|state| {
            previous = *state;
            match *state {
                ServerState::Idle => {
                    *state = ServerState::Stopped;
                    true
                }
                ServerState::Preparing | ServerState::Running => {
                    *state = ServerState::Draining;
                    true
                }
                ServerState::Draining | ServerState::Stopped => false,
            }
        });

        match previous {
            ServerState::Idle => {
                tracing::info!(server = %self.config.name, "Stopped before start");
                return Ok(());
            }
            ServerState::Preparing | ServerState::Running => {
                tracing::info!(
                    server = %self.config.name,
                    grace_ms = grace.as_millis() as u64,
                    "Draining connections"
                );
                self.handle.graceful_shutdown(Some(grace));
            }
            ServerState::Draining | ServerState::Stopped => {}
        }

        let limit = grace + RELEASE_MARGIN;
        let mut state = self.state.subscribe();
        let released = tokio::time::timeout(limit, state.wait_for(|s| *s == ServerState::Stopped)).await;
        match released {
            Ok(_) => Ok(()),
            Err(_) => {
                tracing::error!(
                    server = %self.config.name,
                    limit_ms = limit.as_millis() as u64,
                    "Listener not released"
                );
                Err(ServerError::Shutdown(limit))
            }
        }
    }

    /// Serve until `signal` fires, then stop with `grace`.
    pub async fn run_until_shutdown(&self, mut signal: ShutdownSignal, grace: Duration) -> Result<(), ServerError> {
        let run = self.run();
        tokio::pin!(run);

        tokio::select! {
            served = &mut run => served,
            _ = signal.recv() => {
                let (stopped, served) = tokio::join!(self.stop(grace), run);
                served.and(stopped)
            }
        }
    }

    fn dispatcher(&self) -> Dispatcher {
        let timeouts = &self.config.timeouts;
        let router = self
            .router
            .clone()
            .layer(RequestBodyTimeoutLayer::new(timeouts.read()))
            .layer(TraceLayer::new_for_http());
        Dispatcher::with_middleware(router, self.global_middleware.clone()).write_timeout(timeouts.write())
    }

    async fn resolve_address(&self) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let unresolved = |source| ServerError::Address {
            address: address.clone(),
            source,
        };
        tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await
            .map_err(unresolved)?
            .next()
            .ok_or_else(|| unresolved(io::Error::new(io::ErrorKind::NotFound, "no addresses")))
    }
}

fn configure_http(builder: &mut Builder<TokioExecutor>, read_header: Duration) {
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(read_header);
    builder.http2().timer(TokioTimer::new());
}
