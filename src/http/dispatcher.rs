//! Top-level request service handed to hyper.
//!
//! # Responsibilities
//! - Run global middleware around the dispatch router (404 fallback included)
//! - Catch panics that escaped every endpoint wrapper
//! - Enforce the server write timeout on producing a response
//! - Turn an aborted request into a service error
//!
//! # Design Decisions
//! - Errors returned from this service make hyper close the connection
//!   without writing anything. That is the only way an aborted or overdue
//!   request is surfaced to the client
//! - The write deadline covers the handler producing its response head; a
//!   streaming body is left to the idle timeout

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::Request;
use axum::http;
use axum::response::Response;
use axum::{BoxError, Router};
use thiserror::Error;
use tower::{Service, ServiceExt};

use crate::http::{chain, Handler, Middleware};
use crate::resilience::timeouts::{guarded, is_aborted, with_deadline, Outcome};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request aborted by a panicking handler")]
    Aborted,

    #[error("response not produced within the write timeout")]
    WriteTimeout,
}

/// Tower service serving one dispatch router.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handler: Handler,
    write_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self {
            handler: router_handler(router),
            write_timeout: None,
        }
    }

    /// Wrap `router` in `middleware`, outermost first.
    pub fn with_middleware(router: Router, middleware: Vec<Middleware>) -> Self {
        Self {
            handler: chain(middleware, router_handler(router)),
            write_timeout: None,
        }
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}

fn router_handler(router: Router) -> Handler {
    Handler::new(move |req: Request| {
        let router = router.clone();
        async move {
            match router.oneshot(req).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        }
    })
}

impl<B> Service<http::Request<B>> for Dispatcher
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = DispatchError;
    type Future = Pin<Box<dyn Future<Output = Result<Response, DispatchError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let handler = self.handler.clone();
        let write_timeout = self.write_timeout;

        Box::pin(async move {
            let req = req.map(Body::new);
            let method = req.method().clone();
            let path = req.uri().path().to_owned();

            let run = guarded(&path, async move { handler.call(req).await });
            let outcome = match write_timeout {
                Some(deadline) => with_deadline(deadline, run).await,
                None => run.await,
            };

            match outcome {
                Outcome::Success(response) if is_aborted(&response) => Err(DispatchError::Aborted),
                Outcome::Success(response) => Ok(response),
                Outcome::Aborted => Err(DispatchError::Aborted),
                Outcome::Timeout => {
                    tracing::warn!(
                        method = %method,
                        path = %path,
                        "Write timeout exceeded, closing connection"
                    );
                    Err(DispatchError::WriteTimeout)
                }
            }
        })
    }
}
