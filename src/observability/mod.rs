//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → logging.rs (structured log events, request ID field)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//!     → optional Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
