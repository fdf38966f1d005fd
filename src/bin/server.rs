//! HTTP server for the Mini Data Query Engine
//! Plain tokio server; see `mini_query_engine::server`.

use anyhow::{Context, Result};
use mini_query_engine::catalog::Catalog;
use mini_query_engine::config::ServerConfig;
use mini_query_engine::server::Server;
use mini_query_engine::service::QueryService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Mini Data Query Engine API server...");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => {
            info!("Using builtin catalog");
            Catalog::builtin()
        }
    };

    let service = QueryService::new(Arc::new(catalog), config.credentials.clone());
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let server = Server::new(service, &config);
    tokio::select! {
        result = server.run(listener) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
