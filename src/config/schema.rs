//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every default reproduces the proxy's fixed out-of-the-box behavior.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (loopback host and port).
    pub listener: ListenerConfig,

    /// Upstream API host requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Cross-origin headers injected into responses.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind. Loopback keeps the proxy reachable from this machine only.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` form used for binding and logging.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; the inbound path and query are appended unchanged.
    pub base_url: String,

    /// Upstream response headers copied back to the caller.
    /// Everything not listed here is dropped.
    pub preserve_response_headers: Vec<String>,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` for the upstream call.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            preserve_response_headers: Vec::new(),
            use_system_proxy: true,
        }
    }
}

/// CORS header values.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// `Access-Control-Allow-Origin`, set on every response.
    pub allow_origin: String,

    /// `Access-Control-Allow-Methods`, set on preflight responses.
    pub allow_methods: String,

    /// `Access-Control-Allow-Headers`, set on preflight responses.
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Prometheus exporter bind address. Empty disables the exporter.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: String::new(),
        }
    }
}
