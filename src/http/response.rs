//! Response construction.
//!
//! # Responsibilities
//! - Relay upstream status and body verbatim
//! - Stamp `Content-Type: application/json` on relayed and error responses
//! - Map local failures to a 500 with the caller's expected JSON envelope
//!
//! # Design Decisions
//! - Upstream bodies are never rewritten, even for 4xx/5xx
//! - GET failures use the flat envelope, POST failures the typed one

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::json;

use crate::error::ProxyError;
use crate::upstream::UpstreamResponse;

/// `type` field of the typed error envelope.
pub const PROXY_ERROR_TYPE: &str = "proxy_error";

/// Shape of the JSON body for a local failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorEnvelope {
    /// `{"error": "<message>"}`
    Flat,
    /// `{"error": {"message": "<message>", "type": "proxy_error"}}`
    Typed,
}

impl ErrorEnvelope {
    pub fn render(self, message: &str) -> String {
        let value = match self {
            ErrorEnvelope::Flat => json!({ "error": message }),
            ErrorEnvelope::Typed => json!({
                "error": { "message": message, "type": PROXY_ERROR_TYPE }
            }),
        };
        value.to_string()
    }
}

/// Relay an upstream reply to the caller.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    let headers = response.headers_mut();
    headers.extend(upstream.headers);
    headers.insert(header::CONTENT_TYPE, json_content_type());
    response
}

/// 500 response for a local failure.
pub fn error_response(envelope: ErrorEnvelope, err: &ProxyError) -> Response {
    let mut response = Response::new(Body::from(envelope.render(&err.message())));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, json_content_type());
    response
}

fn json_content_type() -> HeaderValue {
    HeaderValue::from_static("application/json")
}
