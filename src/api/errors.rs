// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::embeddings::EmbeddingError;

/// Body of every error the service returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Message for failures whose cause is not exposed to the caller
pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

#[derive(Debug)]
pub enum ApiError {
    /// Input is empty after trimming
    InvalidInput(String),
    /// Body could not be parsed into the request type
    MalformedBody { status: StatusCode, message: String },
    /// Model failed to load or run
    Embedding(EmbeddingError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody { status, .. } => *status,
            ApiError::Embedding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::MalformedBody { message, .. } => message.clone(),
            ApiError::Embedding(_) => INTERNAL_ERROR_DETAIL.to_string(),
        };
        ErrorResponse { detail }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::MalformedBody { message, .. } => write!(f, "Malformed body: {}", message),
            ApiError::Embedding(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Embedding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EmbeddingError> for ApiError {
    fn from(e: EmbeddingError) -> Self {
        ApiError::Embedding(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Rejected request");
        }

        (status, Json(self.to_response())).into_response()
    }
}
