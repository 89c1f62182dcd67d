// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings
//!
//! OpenAI-compatible shape for a single input: `{"input": "..."}` in,
//! `{"data": [{"embedding": [...]}]}` out.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{server::AppState, ApiError};
use crate::embeddings::EmbeddingError;

pub const EMPTY_INPUT_DETAIL: &str = "Input must not be empty";

/// Request body for POST /v1/embeddings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub input: String,
}

impl EmbeddingRequest {
    /// Returns the input with surrounding whitespace removed
    ///
    /// # Errors
    /// `ApiError::InvalidInput` when nothing is left after trimming.
    pub fn validated_input(&self) -> Result<&str, ApiError> {
        let text = self.input.trim();
        if text.is_empty() {
            return Err(ApiError::InvalidInput(EMPTY_INPUT_DETAIL.to_string()));
        }
        Ok(text)
    }
}

/// One embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingData {
    pub embedding: Vec<f64>,
}

/// Response body for POST /v1/embeddings; always holds exactly one item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

impl EmbeddingResponse {
    pub fn single(embedding: Vec<f64>) -> Self {
        Self {
            data: vec![EmbeddingData { embedding }],
        }
    }
}

/// Converts whatever numeric sequence the model produced into the transport
/// vector. Order and length are preserved.
pub fn to_embedding_vector<I>(raw: I) -> Vec<f64>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    raw.into_iter().map(Into::into).collect()
}

pub async fn embeddings_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbeddingRequest>, JsonRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let Json(request) = payload?;
    let text = request.validated_input()?.to_owned();

    let embedder = state.provider.get_embedder().await?;

    let raw = tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .map_err(|e| EmbeddingError::Worker(e.to_string()))??;

    debug!(dimension = raw.len(), "Embedding generated");
    Ok(Json(EmbeddingResponse::single(to_embedding_vector(raw))))
}
