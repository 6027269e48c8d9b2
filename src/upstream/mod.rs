//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Exchange (method, path, headers, body)
//!     → client.rs (rewrite host, pick forwarded headers)
//!     → one reqwest call to base_url + path
//!     → UpstreamResponse (status, preserved headers, body)
//! ```

pub mod client;

pub use client::{UpstreamClient, UpstreamResponse, DEFAULT_CONTENT_TYPE};
