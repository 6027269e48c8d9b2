//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

use local_api_proxy::{HttpServer, ProxyConfig, Shutdown};

/// One request as the mock upstream saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A mock upstream that records every request and replies with a fixed response.
pub struct MockUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

/// Start a mock upstream returning `status`, `headers` and `body` for every request.
pub async fn start_upstream(
    status: u16,
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let sink = sink.clone();
        async move {
            let (parts, request_body) = request.into_parts();
            let request_body = axum::body::to_bytes(request_body, usize::MAX)
                .await
                .unwrap_or_default();
            sink.lock().unwrap().push(Captured {
                method: parts.method,
                path: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body: request_body,
            });

            let mut response = Response::new(Body::from(body));
            *response.status_mut() = StatusCode::from_u16(status).unwrap();
            for &(name, value) in headers {
                response
                    .headers_mut()
                    .insert(name, HeaderValue::from_static(value));
            }
            response
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, captured }
}

/// Address on loopback where nothing is listening.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Default config pointed at `base_url`, ignoring any system proxy.
pub fn proxy_config(base_url: String) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = base_url;
    config.upstream.use_system_proxy = false;
    config
}

/// Start the proxy on an ephemeral loopback port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Test client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
