//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the GET/POST/OPTIONS handlers
//! - Wire up middleware (request ID, tracing, allow-origin header)
//! - Bind server to listener and serve until shutdown
//! - Forward each exchange to the upstream and relay the result
//! - Observability (structured logs, metrics per exchange)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ServerError;
use crate::http::cors::CorsHeaders;
use crate::http::request::{request_id, Exchange, MakeExchangeId};
use crate::http::response::{error_response, relay, ErrorEnvelope};
use crate::lifecycle::shutdown;
use crate::observability::metrics::{self, Outcome};
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub cors: Arc<CorsHeaders>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config.upstream)?),
            cors: Arc::new(CorsHeaders::from_config(&config.cors)?),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let allow_origin = state.cors.allow_origin_layer();
        let exchange = get(handle_get).post(handle_post).options(handle_options);

        Router::new()
            .route("/{*path}", exchange.clone())
            .route("/", exchange)
            .with_state(state)
            .layer(allow_origin)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeExchangeId))
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight exchanges.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Preflight: answered locally, never forwarded.
async fn handle_options(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    tracing::debug!(
        request_id = %request_id(&request),
        path = %request.uri().path(),
        "Answering preflight"
    );
    metrics::record_exchange("OPTIONS", StatusCode::OK.as_u16(), Outcome::Preflight, start);
    state.cors.preflight()
}

async fn handle_get(State(state): State<AppState>, request: Request<Body>) -> Response {
    forward(&state, request, ErrorEnvelope::Flat).await
}

async fn handle_post(State(state): State<AppState>, request: Request<Body>) -> Response {
    forward(&state, request, ErrorEnvelope::Typed).await
}

/// One exchange: read, forward once, relay or wrap the failure.
async fn forward(state: &AppState, request: Request<Body>, envelope: ErrorEnvelope) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let target = state.upstream.target_url(
        request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/"),
    );

    tracing::info!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Forwarding request"
    );

    let result = match Exchange::read(request).await {
        Ok(exchange) => state.upstream.send(&exchange).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(upstream) => {
            let status = upstream.status;
            if status.is_success() {
                tracing::info!(request_id = %request_id, status = %status, "Upstream responded");
            } else {
                tracing::warn!(request_id = %request_id, status = %status, "Relaying upstream error");
            }
            metrics::record_exchange(method.as_str(), status.as_u16(), Outcome::Relayed, start);
            relay(upstream)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                target = %target,
                error = %e.message(),
                "Exchange failed"
            );
            metrics::record_exchange(
                method.as_str(),
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                Outcome::Failed,
                start,
            );
            error_response(envelope, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Nothing listens on port 1, so every upstream call is refused.
    fn refused_upstream_server() -> HttpServer {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://127.0.0.1:1".into();
        config.upstream.use_system_proxy = false;
        HttpServer::new(config).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn options_is_answered_locally() {
        let server = refused_upstream_server();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/v1/chat/completions")
            .body(Body::empty())
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let server = refused_upstream_server();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("x-request-id", "trace-me")
            .body(Body::empty())
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "trace-me");
    }

    #[tokio::test]
    async fn unsupported_method_still_gets_allow_origin() {
        let server = refused_upstream_server();
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/v1/files")
            .body(Body::empty())
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn post_without_content_length_is_proxy_error() {
        let server = refused_upstream_server();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/chat/completions")
            .body(Body::from(r#"{"model":"x"}"#))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "proxy_error");
        assert_eq!(body["error"]["message"], "missing Content-Length header");
    }

    #[tokio::test]
    async fn refused_get_uses_flat_envelope() {
        let server = refused_upstream_server();
        let request = Request::builder()
            .uri("/v1/models")
            .body(Body::empty())
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("upstream request failed"));
    }

    #[tokio::test]
    async fn configured_origin_is_used() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://127.0.0.1:1".into();
        config.upstream.use_system_proxy = false;
        config.cors.allow_origin = "chrome-extension://abcdef".into();
        let server = HttpServer::new(config).unwrap();

        let request = Request::builder()
            .uri("/v1/models")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "chrome-extension://abcdef"
        );
    }

    #[test]
    fn invalid_cors_config_is_rejected() {
        let mut config = ProxyConfig::default();
        config.cors.allow_methods = "GET\n".into();
        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::InvalidHeaderValue { field: "allow_methods", .. })
        ));
    }
}
