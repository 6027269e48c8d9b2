//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every exchange
//! - Turn an inbound request into an `Exchange`
//! - Read exactly the number of body bytes `Content-Length` declares
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, never forwarded upstream
//! - Only POST carries a body; GET bodies are ignored
//! - A missing or short body is a local failure, not a partial forward

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::ProxyError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeExchangeId;

impl MakeRequestId for MakeExchangeId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"` if none was assigned.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// One inbound request, ready to forward.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    /// Path plus query, exactly as received.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Exchange {
    /// Consume an inbound request. POST bodies are read to their declared length.
    pub async fn read(request: Request<Body>) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let body = if parts.method == Method::POST {
            let declared = declared_length(&parts.headers)?;
            Some(read_declared(body, declared).await?)
        } else {
            None
        };

        Ok(Self {
            method: parts.method,
            path,
            headers: parts.headers,
            body,
        })
    }
}

fn declared_length(headers: &HeaderMap) -> Result<usize, ProxyError> {
    let value = headers
        .get(header::CONTENT_LENGTH)
        .ok_or(ProxyError::MissingContentLength)?;
    let text = value
        .to_str()
        .map_err(|_| ProxyError::InvalidContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;
    text.trim()
        .parse()
        .map_err(|_| ProxyError::InvalidContentLength(text.to_string()))
}

async fn read_declared(body: Body, declared: usize) -> Result<Bytes, ProxyError> {
    let bytes = axum::body::to_bytes(body, declared).await.map_err(ProxyError::Body)?;
    if bytes.len() < declared {
        return Err(ProxyError::TruncatedBody {
            declared,
            received: bytes.len(),
        });
    }
    Ok(bytes)
}
