// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;

pub use api::{create_app, AppState};
pub use config::ServerConfig;
pub use embeddings::{Embedder, EmbeddingError, ModelLoader, ModelProvider};
