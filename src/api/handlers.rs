// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::server::AppState;

pub const LANDING_MESSAGE: &str = "Use POST /v1/embeddings for embeddings";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingResponse {
    pub status: String,
    pub message: String,
}

/// Liveness only: reports the configured model without loading it.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.provider.model_id().to_string(),
    })
}

pub async fn landing_handler() -> Json<LandingResponse> {
    Json(LandingResponse {
        status: "ok".to_string(),
        message: LANDING_MESSAGE.to_string(),
    })
}

// Browsers request this on every page load
pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}
