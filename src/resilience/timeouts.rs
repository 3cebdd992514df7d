//! Request timeout and panic isolation wrapper.
//!
//! # Responsibilities
//! - Bound how long a handler may take before the client gets a response
//! - Keep a panicking handler from writing anything or taking the process down
//! - Make sure exactly one outcome reaches the client
//!
//! # Design Decisions
//! - Two layers: [`guarded`] isolates panics, [`with_deadline`] races the
//!   guarded future against a timer
//! - The outcome is an explicit [`Outcome`] value, so "already logged, write
//!   nothing" is a variant rather than a second panic
//! - On deadline the handler future is dropped; nothing it would have produced
//!   can reach the response
//! - An aborted request becomes an empty response tagged with [`Aborted`];
//!   the dispatcher turns that tag into a connection teardown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::Handler;
use crate::resilience::panic::isolate;

/// Message written when no other is configured.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "request timeout";

/// Status written when no other is configured.
pub const DEFAULT_TIMEOUT_STATUS: StatusCode = StatusCode::SERVICE_UNAVAILABLE;

/// Result of running one request through the wrapper.
#[derive(Debug)]
pub enum Outcome {
    /// The handler finished in time.
    Success(Response),
    /// The deadline elapsed first.
    Timeout,
    /// The handler panicked; the panic has already been logged.
    Aborted,
}

/// Response extension marking a request whose handler panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

/// Deadline and timeout response for one endpoint.
#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    pub duration: Duration,
    pub status: StatusCode,
    pub message: Arc<str>,
}

impl TimeoutPolicy {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            status: DEFAULT_TIMEOUT_STATUS,
            message: DEFAULT_TIMEOUT_MESSAGE.into(),
        }
    }
}

impl Outcome {
    pub fn into_response(self, policy: &TimeoutPolicy) -> Response {
        match self {
            Outcome::Success(response) => response,
            Outcome::Timeout => (policy.status, policy.message.to_string()).into_response(),
            Outcome::Aborted => aborted_response(),
        }
    }
}

/// Inner layer: run `future`, logging a panic once with its backtrace.
pub async fn guarded<F>(route: &str, future: F) -> Outcome
where
    F: Future<Output = Response>,
{
    match isolate(future).await {
        Ok(response) => Outcome::Success(response),
        Err(report) => {
            tracing::error!(
                route = %route,
                panic = %report.message,
                backtrace = %report.trace,
                "request handler panicked"
            );
            Outcome::Aborted
        }
    }
}

/// Outer layer: first of the inner outcome and the deadline.
pub async fn with_deadline<F>(deadline: Duration, inner: F) -> Outcome
where
    F: Future<Output = Outcome>,
{
    tokio::time::timeout(deadline, inner)
        .await
        .unwrap_or(Outcome::Timeout)
}

/// Wrap `handler` with both layers.
pub fn with_timeout(handler: Handler, route: impl Into<Arc<str>>, policy: TimeoutPolicy) -> Handler {
    let route: Arc<str> = route.into();
    Handler::new(move |req: Request| {
        let handler = handler.clone();
        let route = Arc::clone(&route);
        let policy = policy.clone();
        async move {
            // Calling inside the scope also isolates panics raised before the
            // handler's first await.
            let inner = async move { handler.call(req).await };
            let outcome = with_deadline(policy.duration, guarded(&route, inner)).await;
            if matches!(outcome, Outcome::Timeout) {
                tracing::warn!(
                    route = %route,
                    timeout_ms = policy.duration.as_millis() as u64,
                    "request timed out"
                );
            }
            outcome.into_response(&policy)
        }
    })
}

/// An empty response that must never be written to the client.
pub fn aborted_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.extensions_mut().insert(Aborted);
    response
}

pub fn is_aborted(response: &Response) -> bool {
    response.extensions().get::<Aborted>().is_some()
}
