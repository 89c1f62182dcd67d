// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding error types.

use thiserror::Error;

/// Errors raised while loading or running an embedding model.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The model could not be resolved, downloaded, or initialized
    #[error("Failed to load embedding model '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    /// The model was loaded but a forward pass failed
    #[error("Embedding inference failed: {0}")]
    Inference(String),

    /// The blocking worker running a load or inference panicked or was cancelled
    #[error("Embedding worker failed: {0}")]
    Worker(String),
}

impl EmbeddingError {
    pub fn model_load(model: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        EmbeddingError::ModelLoad {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl std::fmt::Display) -> Self {
        EmbeddingError::Inference(reason.to_string())
    }
}
