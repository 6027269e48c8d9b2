//! Error types.
//!
//! `ProxyError` is scoped to a single exchange: it is always caught at the
//! handler boundary and turned into a 500 response. `ServerError` covers
//! failures while assembling the server from its configuration.

use thiserror::Error;

/// A local failure while handling one exchange.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("invalid Content-Length header {0:?}")]
    InvalidContentLength(String),

    #[error("request body ended after {received} of {declared} declared bytes")]
    TruncatedBody { declared: usize, received: usize },

    #[error("failed to read request body")]
    Body(#[source] axum::Error),

    #[error("upstream request failed")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// Display text followed by the source chain, joined with `": "`.
    pub fn message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// Failure assembling the server from a configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid header value for {field}: {value:?}")]
    InvalidHeaderValue { field: &'static str, value: String },

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_without_source_is_display() {
        let err = ProxyError::InvalidContentLength("abc".into());
        assert_eq!(err.message(), "invalid Content-Length header \"abc\"");
    }

    #[test]
    fn message_includes_source_chain() {
        let err = ProxyError::Body(axum::Error::new(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection reset",
        )));
        let message = err.message();
        assert!(message.starts_with("failed to read request body: "));
        assert!(message.contains("connection reset"));
    }
}
