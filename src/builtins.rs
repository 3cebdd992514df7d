//! Handlers and middleware every deployment can reference by name.
//!
//! | name                        | kind               |
//! |-----------------------------|--------------------|
//! | `health`                    | handler            |
//! | `static:<status>;<message>` | handler factory    |
//! | `request-id`                | middleware         |
//! | `access-log`                | middleware         |
//! | `set-header:<name>;<value>` | middleware factory |

use std::future::ready;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use uuid::Uuid;

use crate::http::response::respond_message;
use crate::http::{Handler, Middleware, Next};
use crate::registry::{FactoryError, RegistryBuilder, RegistryError};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Add every built-in to `builder`.
pub fn register(builder: RegistryBuilder) -> Result<RegistryBuilder, RegistryError> {
    builder
        .handler("health", health())?
        .handler_factory("static", static_handler)?
        .middleware("request-id", request_id())?
        .middleware("access-log", access_log())?
        .middleware_factory("set-header", set_header)
}

fn health() -> Handler {
    Handler::new(|_req| ready(respond_message(StatusCode::OK, "ok")))
}

/// `static:<status>` or `static:<status>;<message>`. Without a message the
/// canonical reason phrase is used.
fn static_handler(_family: &str, args: &[String]) -> Result<Handler, FactoryError> {
    let (raw_status, message) = match args {
        [status] => (status, None),
        [status, message] => (status, Some(message.clone())),
        _ => return Err(FactoryError::new("expected <status> or <status>;<message>")),
    };
    let status = raw_status
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| FactoryError::new(format!("invalid status `{raw_status}`")))?;
    let message = message
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    Ok(Handler::new(move |_req| ready(respond_message(status, message.clone()))))
}

/// Tags request and response with an `x-request-id`, keeping one the client
/// already sent.
fn request_id() -> Middleware {
    Middleware::from_fn(|mut req: Request, next: Next| async move {
        let id = match req.headers().get(&X_REQUEST_ID) {
            Some(existing) => existing.clone(),
            None => {
                let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
                req.headers_mut().insert(X_REQUEST_ID, generated.clone());
                generated
            }
        };

        let mut resp = next.run(req).await;
        resp.headers_mut().entry(X_REQUEST_ID).or_insert(id);
        resp
    })
}

fn access_log() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let request_id = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_owned();

        let resp = next.run(req).await;
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = resp.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        resp
    })
}

/// `set-header:<name>;<value>`: sets a response header unless the handler
/// already did.
fn set_header(_family: &str, args: &[String]) -> Result<Middleware, FactoryError> {
    let [name, value] = args else {
        return Err(FactoryError::new("expected <name>;<value>"));
    };
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| FactoryError::new(format!("header name `{name}`: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| FactoryError::new(format!("header value `{value}`: {e}")))?;

    Ok(Middleware::from_fn(move |req: Request, next: Next| {
        let name = name.clone();
        let value = value.clone();
        async move {
            let mut resp = next.run(req).await;
            resp.headers_mut().entry(name).or_insert(value);
            resp
        }
    }))
}
