//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → OPTIONS: cors.rs answers locally
//!     → GET/POST: request.rs builds the Exchange
//!     → upstream client forwards it once
//!     → response.rs relays the reply or wraps the failure
//!     → cors.rs layer stamps Access-Control-Allow-Origin
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::{Exchange, X_REQUEST_ID};
pub use server::HttpServer;
