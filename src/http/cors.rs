//! Cross-origin headers.
//!
//! The allow-origin header goes on every response, including the ones the
//! router produces itself (405), so it is applied as a response layer. The
//! methods/headers pair only appears on preflight replies.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CorsConfig;
use crate::error::ServerError;

/// Parsed CORS header values.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    pub allow_origin: HeaderValue,
    pub allow_methods: HeaderValue,
    pub allow_headers: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ServerError> {
        Ok(Self {
            allow_origin: parse("allow_origin", &config.allow_origin)?,
            allow_methods: parse("allow_methods", &config.allow_methods)?,
            allow_headers: parse("allow_headers", &config.allow_headers)?,
        })
    }

    /// Layer that overrides `Access-Control-Allow-Origin` on every response.
    pub fn allow_origin_layer(&self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        )
    }

    /// 200 with an empty body and the full CORS header set.
    pub fn preflight(&self) -> Response {
        (
            StatusCode::OK,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone()),
                (header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone()),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone()),
            ],
        )
            .into_response()
    }
}

fn parse(field: &'static str, value: &str) -> Result<HeaderValue, ServerError> {
    HeaderValue::from_str(value).map_err(|_| ServerError::InvalidHeaderValue {
        field,
        value: value.to_string(),
    })
}
