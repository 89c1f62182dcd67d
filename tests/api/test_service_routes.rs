// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Auxiliary routes: /healthz, / and /favicon.ico

use axum::http::StatusCode;
use std::sync::Arc;

use super::support::*;

#[tokio::test]
async fn test_healthz_reports_configured_model() {
    let loader = Arc::new(CountingLoader::new());
    let provider = provider_with(loader.clone());

    let response = get(app_with(provider.clone()), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"status": "ok", "model": TEST_MODEL}));

    // Liveness only: the model is not loaded by a health check
    assert_eq!(loader.loads(), 0);
    assert!(!provider.is_loaded());
}

#[tokio::test]
async fn test_healthz_unchanged_after_embedding() {
    let loader = Arc::new(CountingLoader::new());
    let provider = provider_with(loader.clone());

    let response = post_json(
        app_with(provider.clone()),
        "/v1/embeddings",
        r#"{"input": "warm up"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app_with(provider), "/healthz").await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model"], TEST_MODEL);
}

#[tokio::test]
async fn test_landing_route() {
    let app = app_with(provider_with(Arc::new(CountingLoader::new())));

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "status": "ok",
            "message": "Use POST /v1/embeddings for embeddings"
        })
    );
}

#[tokio::test]
async fn test_favicon_no_content() {
    let app = app_with(provider_with(Arc::new(CountingLoader::new())));

    let response = get(app, "/favicon.ico").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = app_with(provider_with(Arc::new(CountingLoader::new())));

    let response = get(app, "/v1/models").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
