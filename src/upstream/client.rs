//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Build the upstream URL from the base URL and the inbound path
//! - Forward only `Authorization` and, for POST, `Content-Type`
//! - Issue exactly one upstream call per exchange, no retries
//! - Buffer the upstream body and keep the configured response headers
//!
//! # Design Decisions
//! - Non-2xx statuses are data, not errors: they are relayed verbatim
//! - Transport defaults apply (no client timeout is configured)

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ServerError};
use crate::http::request::Exchange;

/// Default `Content-Type` for forwarded POST bodies.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// What came back from the upstream for one exchange.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Only the headers named in `preserve_response_headers`.
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Client bound to a single upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    preserve: Vec<HeaderName>,
}

impl UpstreamClient {
    /// Build a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ServerError> {
        let preserve = config
            .preserve_response_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| ServerError::InvalidHeaderName(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = reqwest::Client::builder();
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(ServerError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            preserve,
        })
    }

    /// Upstream URL for an inbound path (query included).
    pub fn target_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Forward one exchange and buffer the upstream reply.
    pub async fn send(&self, exchange: &Exchange) -> Result<UpstreamResponse, ProxyError> {
        let url = self.target_url(&exchange.path);
        let mut builder = self.client.request(exchange.method.clone(), &url);

        if let Some(auth) = exchange.headers.get(header::AUTHORIZATION) {
            builder = builder.header(header::AUTHORIZATION, auth.clone());
        }

        if exchange.method == Method::POST {
            let content_type = exchange
                .headers
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        if let Some(body) = &exchange.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = self.preserved_headers(response.headers());
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    fn preserved_headers(&self, upstream: &HeaderMap) -> HeaderMap {
        let mut kept = HeaderMap::new();
        for name in &self.preserve {
            for value in upstream.get_all(name) {
                kept.append(name.clone(), value.clone());
            }
        }
        kept
    }
}
