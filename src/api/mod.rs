// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embeddings;
pub mod errors;
pub mod handlers;
pub mod server;

pub use embeddings::{
    embeddings_handler, to_embedding_vector, EmbeddingData, EmbeddingRequest, EmbeddingResponse,
};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, LandingResponse};
pub use server::{create_app, serve, shutdown_signal, AppState};
