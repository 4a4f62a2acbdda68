//! Admin gateway.
//!
//! A forwarding gateway between the admin panel and the upstream API that
//! owns users, registration requests and sessions.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                ADMIN GATEWAY                 │
//!                         │                                              │
//!     Browser Request     │  ┌─────────┐    ┌──────────┐   ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│ routing  │──▶│ forward  │──┼──▶ Upstream API
//!                         │  │ server  │    │  rules   │   │ request  │  │
//!                         │  └─────────┘    └──────────┘   └────┬─────┘  │
//!                         │                                     │        │
//!     Browser Response    │  ┌──────────────────────────┐       │        │
//!     ◀───────────────────┼──│ response (JSON/text,     │◀──────┘◀───────┼─── Set-Cookie, body
//!                         │  │ Set-Cookie relay)        │                │
//!                         │  └──────────────────────────┘                │
//!                         │                                              │
//!                         │   config · observability · lifecycle         │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use admin_gateway::config::load_config;
use admin_gateway::http::HttpServer;
use admin_gateway::lifecycle::{signals, Shutdown};
use admin_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "admin-gateway")]
#[command(about = "Forwarding gateway for the admin panel", long_about = None)]
struct Args {
    /// Optional TOML config file. `API_URL` is required unless the file sets it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet.
            eprintln!("admin-gateway: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("admin-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&bind_address).await?;

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::trigger_on_signal(&signal_shutdown).await;
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
