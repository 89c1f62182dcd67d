// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::embeddings::embeddings_handler;
use super::handlers::{favicon_handler, health_handler, landing_handler};
use crate::embeddings::ModelProvider;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: Arc<ModelProvider>,
}

impl AppState {
    pub fn new(provider: Arc<ModelProvider>) -> Self {
        Self { provider }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/healthz", get(health_handler))
        .route("/favicon.ico", get(favicon_handler))
        .route("/v1/embeddings", post(embeddings_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, model = %state.provider.model_id(), "Embedding server listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("Embedding server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
