// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Test doubles and request helpers shared by the API tests.

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use local_embedding_server::{
    create_app, AppState, Embedder, EmbeddingError, ModelLoader, ModelProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

pub const TEST_MODEL: &str = "test/fake-minilm";
pub const TEST_DIMENSION: usize = 384;

/// Deterministic stand-in for a sentence-transformer
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
}

impl Embedder for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let seed = text.len() as f32;
        Ok((0..TEST_DIMENSION)
            .map(|i| ((seed + i as f32) * 0.01).sin())
            .collect())
    }
}

/// Counts how many times the model is loaded
pub struct CountingLoader {
    pub loads: AtomicUsize,
    pub embedder: Arc<FakeEmbedder>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            embedder: Arc::new(FakeEmbedder {
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
    }
}

impl ModelLoader for CountingLoader {
    fn load(&self, _model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let embedder: Arc<dyn Embedder> = self.embedder.clone();
        Ok(embedder)
    }
}

/// Always fails, as an unknown model id would
pub struct FailingLoader {
    pub attempts: AtomicUsize,
}

impl ModelLoader for FailingLoader {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingError::model_load(model_id, "repository not found"))
    }
}

/// Loads fine, but every forward pass fails
pub struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::inference("tensor shape mismatch"))
    }
}

pub struct BrokenModelLoader;

impl ModelLoader for BrokenModelLoader {
    fn load(&self, _model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        Ok(Arc::new(BrokenEmbedder))
    }
}

pub fn provider_with(loader: Arc<dyn ModelLoader>) -> Arc<ModelProvider> {
    Arc::new(ModelProvider::new(TEST_MODEL, loader))
}

pub fn app_with(provider: Arc<ModelProvider>) -> Router {
    create_app(AppState::new(provider))
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "Body is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&bytes)
        )
    })
}
