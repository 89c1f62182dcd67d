// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Lazily-initialized, process-wide embedding handle.
//!
//! The handle is created on the first `get_embedder()` call and reused for the
//! lifetime of the provider. Concurrent first callers wait on a single
//! in-flight load. A failed load leaves the provider empty, so the next call
//! retries it.

use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::embeddings::{Embedder, EmbeddingError, ModelLoader};

pub struct ModelProvider {
    model_id: String,
    loader: Arc<dyn ModelLoader>,
    embedder: Arc<OnceCell<Arc<dyn Embedder>>>,
}

impl fmt::Debug for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProvider")
            .field("model_id", &self.model_id)
            .field("is_loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl ModelProvider {
    /// Stores the configuration only; nothing is loaded until first use.
    pub fn new(model_id: impl Into<String>, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            model_id: model_id.into(),
            loader,
            embedder: Arc::new(OnceCell::new()),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Whether a handle has been created. Never triggers a load.
    pub fn is_loaded(&self) -> bool {
        self.embedder.initialized()
    }

    /// Returns the shared handle, loading the model on first use.
    ///
    /// Initialization runs in its own task, so a caller that is dropped
    /// mid-load (client disconnect, timeout) does not abandon the load; later
    /// callers wait on the same one.
    pub async fn get_embedder(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        if let Some(embedder) = self.embedder.get() {
            return Ok(Arc::clone(embedder));
        }

        let cell = Arc::clone(&self.embedder);
        let loader = Arc::clone(&self.loader);
        let model_id = self.model_id.clone();

        tokio::spawn(async move {
            cell.get_or_try_init(|| load_model(loader, model_id))
                .await
                .map(Arc::clone)
        })
        .await
        .map_err(|e| EmbeddingError::Worker(e.to_string()))?
    }
}

/// Runs the blocking load on a worker thread.
async fn load_model(
    loader: Arc<dyn ModelLoader>,
    model_id: String,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    info!(model = %model_id, "Loading embedding model");
    let id = model_id.clone();
    let result = tokio::task::spawn_blocking(move || loader.load(&id))
        .await
        .map_err(|e| EmbeddingError::Worker(e.to_string()))?;

    match &result {
        Ok(_) => info!(model = %model_id, "Embedding model ready"),
        Err(e) => error!(model = %model_id, error = %e, "Embedding model failed to load"),
    }
    result
}
