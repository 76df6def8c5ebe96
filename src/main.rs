//! Task API server (v1)
//!
//! A small task-management API built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ axum server ──▶ dispatcher ──▶ route table ──▶ handler
//!                   (request id,     (method +      (compiled       │
//!                    timeout,         path/query)    patterns)      │
//!                    body limit)                                    ▼
//!                                                          ┌────────────────┐
//!   Client Response                                        │ Database       │
//!   ◀───────────────────────────────────────────────────── │ (tasks, users) │
//!                                                          └───────┬────────┘
//!                                                                  │ rewrite
//!                                                                  ▼
//!                                                              db.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use task_api::config::load_config;
use task_api::http::HttpServer;
use task_api::lifecycle::{signals, Shutdown};
use task_api::observability::{logging, metrics};
use task_api::store::Database;

#[derive(Parser)]
#[command(name = "task-api")]
#[command(about = "Task management HTTP API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "TASK_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("task-api v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address(),
        database = %config.storage.database_path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let database = Arc::new(Database::open(&config.storage.database_path).await?);

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, database)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
