// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use local_embedding_server::{
    api::{serve, shutdown_signal, AppState},
    config::ServerConfig,
    embeddings::{ModelProvider, OnnxModelLoader},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.model,
        "🚀 Starting local embedding server"
    );

    // The model loads on the first embedding request, not here
    let provider = Arc::new(ModelProvider::new(
        config.model.clone(),
        Arc::new(OnnxModelLoader),
    ));

    let (host, port) = config.listen_addr();
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    serve(listener, AppState::new(provider), shutdown_signal()).await
}
