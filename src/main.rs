//! Local API forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser extension          ┌──────────────────────────────────────┐
//!     ───────────────────────────┼─▶ listener (127.0.0.1:8765)          │
//!                                │      │                               │
//!                                │      ▼                               │
//!                                │   http::server ── OPTIONS ─▶ cors    │
//!                                │      │ GET/POST                      │
//!                                │      ▼                               │
//!                                │   upstream::client ─────────────────┼──▶ Upstream API
//!                                │      │                               │
//!     ◀──────────────────────────┼── http::response (+ CORS origin)     │
//!                                └──────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use local_api_proxy::config::{load_config, ProxyConfig};
use local_api_proxy::lifecycle::{signals, Shutdown};
use local_api_proxy::observability::{logging, metrics};
use local_api_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "local-api-proxy")]
#[command(about = "Forward browser-extension API calls to a remote host with CORS headers", long_about = None)]
struct Cli {
    /// Optional TOML file overriding the built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("local-api-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        config_file = ?cli.config,
        "Configuration loaded"
    );

    if !config.observability.metrics_address.is_empty() {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");
    tracing::info!("Configure the extension with API Base URL: http://{}/v1", local_addr);
    tracing::info!("Press Ctrl+C to stop");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config)?;

    tokio::spawn(async move {
        signals::forward_to(&shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
