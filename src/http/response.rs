//! Response helpers for route handlers.
//!
//! # Responsibilities
//! - Serialize a payload as JSON
//! - Send raw bytes as an octet stream
//! - Wrap a plain message in the `{"message": ...}` envelope
//!
//! Every helper sets `content-type` and `content-length` explicitly.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};

const JSON: &str = "application/json; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Envelope used by [`respond_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Serialize `payload` as JSON. A serialization failure yields a 500 carrying
/// the error text.
pub fn respond_json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_vec(payload) {
        Ok(data) => with_body(status, JSON, data.into()),
        Err(err) => with_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            PLAIN_TEXT,
            err.to_string().into(),
        ),
    }
}

pub fn respond_bytes(status: StatusCode, bytes: impl Into<Bytes>) -> Response {
    with_body(status, OCTET_STREAM, bytes.into())
}

pub fn respond_message(status: StatusCode, message: impl Into<String>) -> Response {
    respond_json(
        status,
        &Message {
            message: message.into(),
        },
    )
}

fn with_body(status: StatusCode, content_type: &'static str, data: Bytes) -> Response {
    let len = data.len();
    let mut response = Response::new(Body::from(data));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    async fn body_of(resp: Response) -> Bytes {
        axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn message_envelope() {
        let resp = respond_message(StatusCode::CREATED, "success");
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], JSON);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "21");

        let body = body_of(resp).await;
        assert_eq!(&body[..], br#"{"message":"success"}"#);
    }

    #[tokio::test]
    async fn bytes_are_sent_as_octet_stream() {
        let resp = respond_bytes(StatusCode::OK, vec![0u8, 1, 2]);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], OCTET_STREAM);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "3");
        assert_eq!(&body_of(resp).await[..], &[0u8, 1, 2]);
    }

    #[tokio::test]
    async fn unserializable_payload_is_a_server_error() {
        // JSON object keys must be strings.
        let mut payload = HashMap::new();
        payload.insert((1, 2), "tuple key");

        let resp = respond_json(StatusCode::OK, &payload);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], PLAIN_TEXT);
    }
}
