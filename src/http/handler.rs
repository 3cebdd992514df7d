//! Type-erased request handlers and middleware.
//!
//! # Design Decisions
//! - Handlers and middleware are `Arc`-backed so one resolved instance can be
//!   shared by every route that references it
//! - A middleware chain together with its endpoint is itself a [`Handler`]
//! - Middleware at index 0 is the outermost layer

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;

/// Boxed future produced by handlers and middleware.
pub type BoxResponseFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

type HandlerFn = dyn Fn(Request) -> BoxResponseFuture + Send + Sync;
type MiddlewareFn = dyn Fn(Request, Next) -> BoxResponseFuture + Send + Sync;

/// A concrete request handler.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wrap an async function of the request.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |req| Box::pin(f(req))),
        }
    }

    /// Wrap any axum handler, so extractors can be used in route code.
    pub fn from_axum<H, T>(handler: H) -> Self
    where
        H: axum::handler::Handler<T, ()> + Sync,
        T: 'static,
    {
        Self::new(move |req| handler.clone().call(req, ()))
    }

    /// Invoke the handler.
    pub fn call(&self, req: Request) -> BoxResponseFuture {
        (self.inner)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// A concrete middleware: sees the request, decides whether and how to call
/// the rest of the chain, and may rewrite the response.
#[derive(Clone)]
pub struct Middleware {
    inner: Arc<MiddlewareFn>,
}

impl Middleware {
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |req, next| Box::pin(f(req, next))),
        }
    }

    pub fn call(&self, req: Request, next: Next) -> BoxResponseFuture {
        (self.inner)(req, next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// The remainder of a middleware chain.
pub struct Next {
    chain: Arc<[Middleware]>,
    index: usize,
    endpoint: Handler,
}

impl Next {
    /// Run the next middleware, or the endpoint once the chain is exhausted.
    pub fn run(self, req: Request) -> BoxResponseFuture {
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                let next = Next {
                    chain: self.chain,
                    index: self.index + 1,
                    endpoint: self.endpoint,
                };
                middleware.call(req, next)
            }
            None => self.endpoint.call(req),
        }
    }
}

/// Compose `middleware` (outermost first) around `endpoint`.
pub fn chain(middleware: Vec<Middleware>, endpoint: Handler) -> Handler {
    if middleware.is_empty() {
        return endpoint;
    }
    let middleware: Arc<[Middleware]> = middleware.into();
    Handler {
        inner: Arc::new(move |req| {
            Next {
                chain: Arc::clone(&middleware),
                index: 0,
                endpoint: endpoint.clone(),
            }
            .run(req)
        }),
    }
}
