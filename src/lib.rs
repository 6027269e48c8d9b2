//! Local API Forwarding Proxy Library
//!
//! Relays browser-extension requests to a remote API host and adds
//! permissive cross-origin headers to every response.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, ServerError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
