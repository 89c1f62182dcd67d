// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding capability and its lazily-initialized provider.
//!
//! The rest of the crate only sees the [`Embedder`] trait ("text in, vector
//! out"). [`ModelProvider`] owns the single process-wide handle and creates it
//! through a [`ModelLoader`] on first use. The production loader is
//! [`OnnxModelLoader`], which resolves a model identifier with [`hub`] and
//! runs it through ONNX Runtime in [`onnx_model`].

pub mod error;
pub mod hub;
pub mod onnx_model;
pub mod provider;

pub use error::EmbeddingError;
pub use hub::{resolve_model_files, ModelFiles};
pub use onnx_model::{OnnxEmbeddingModel, OnnxModelLoader};
pub use provider::ModelProvider;

use std::sync::Arc;

/// Default model identifier when `EMBEDDING_MODEL` is not set
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// An opaque text-to-vector capability.
///
/// Calls are blocking (CPU-bound inference); async callers run them on a
/// blocking worker.
pub trait Embedder: Send + Sync {
    /// Produces one vector for one piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Creates an [`Embedder`] from a model identifier.
///
/// Loading may block on network or disk I/O for a long time.
pub trait ModelLoader: Send + Sync {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError>;
}
