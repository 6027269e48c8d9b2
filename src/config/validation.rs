//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream base URL is an absolute http(s) URL
//! - Check CORS values and preserved header names are valid HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("listener.port must not be 0")]
    ZeroPort,

    #[error("upstream.base_url {url:?} is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("cors.{field} {value:?} is not a valid header value")]
    CorsValue { field: &'static str, value: String },

    #[error("upstream.preserve_response_headers entry {0:?} is not a valid header name")]
    HeaderName(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error, off")]
    LogLevel(String),
}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if let Err(reason) = check_base_url(&config.upstream.base_url) {
        errors.push(ValidationError::BaseUrl {
            url: config.upstream.base_url.clone(),
            reason,
        });
    }

    for name in &config.upstream.preserve_response_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
        }
    }

    let cors = [
        ("allow_origin", &config.cors.allow_origin),
        ("allow_methods", &config.cors.allow_methods),
        ("allow_headers", &config.cors.allow_headers),
    ];
    for (field, value) in cors {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::CorsValue {
                field,
                value: value.clone(),
            });
        }
    }

    let metrics_address = &config.observability.metrics_address;
    if !metrics_address.is_empty() && metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(metrics_address.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
