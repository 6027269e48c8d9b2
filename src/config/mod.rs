//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (ProxyConfig::default)
//!     or optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the proxy runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CorsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
