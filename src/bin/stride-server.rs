// ABOUTME: Server binary for the Stride fitness platform
// ABOUTME: Wires configuration, database, cache, and the HTTP router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! # Stride Server
//!
//! Starts the HTTP server over the configured database.
//!
//! ## Usage
//!
//! ```bash
//! # Run with environment configuration
//! cargo run --bin stride-server
//!
//! # Override the database URL and port
//! cargo run --bin stride-server -- --database-url sqlite:./data/stride.db --port 9090
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use stride_server::cache::memory::InMemoryCache;
use stride_server::config::ServerConfig;
use stride_server::database::Database;
use stride_server::logging;
use stride_server::routes::{router, ServerResources};

#[derive(Parser)]
#[command(name = "stride-server", about = "Stride fitness API server")]
struct Args {
    /// Override the database URL from the environment
    #[arg(long)]
    database_url: Option<String>,

    /// Override the HTTP port from the environment
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env().context("failed to load configuration")?;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }

    let db = Database::new(&config.database_url)
        .await
        .context("failed to open database")?;

    let cache = Arc::new(InMemoryCache::new());
    let resources = Arc::new(ServerResources::new(db, cache, &config));
    let app = router(resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "Stride server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
