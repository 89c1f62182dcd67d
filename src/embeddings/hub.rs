// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution.
//!
//! A model identifier is either a local directory or a HuggingFace Hub
//! repository id. Hub files are downloaded into the hf-hub cache on first use
//! and read from there afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::embeddings::EmbeddingError;

/// ONNX weight locations, in lookup order
pub const ONNX_MODEL_FILES: &[&str] = &["onnx/model.onnx", "model.onnx"];

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const SENTENCE_CONFIG_FILE: &str = "sentence_bert_config.json";
pub const MODULES_FILE: &str = "modules.json";

/// Used when the model does not ship a sentence_bert_config.json
pub const DEFAULT_MAX_SEQ_LENGTH: usize = 256;

const NORMALIZE_MODULE: &str = "sentence_transformers.models.Normalize";

/// Local paths and pipeline settings for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    /// Tokens beyond this length are truncated
    pub max_seq_length: usize,
    /// Whether the sentence pipeline ends in an L2 normalization step
    pub normalize: bool,
}

#[derive(Debug, Deserialize)]
struct SentenceConfig {
    max_seq_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PipelineModule {
    #[serde(rename = "type")]
    kind: String,
}

/// Resolves `model_id` to files on disk, downloading from the Hub if needed.
pub fn resolve_model_files(model_id: &str) -> Result<ModelFiles, EmbeddingError> {
    let local = Path::new(model_id);
    let result = if local.is_dir() {
        debug!(path = %local.display(), "Using local model directory");
        resolve_with(|name| {
            let path = local.join(name);
            path.is_file().then_some(path)
        })
    } else {
        info!(repo = %model_id, "Resolving model from HuggingFace Hub");
        resolve_from_hub(model_id)
    };

    result.map_err(|e| EmbeddingError::model_load(model_id, format!("{:#}", e)))
}

fn resolve_from_hub(repo_id: &str) -> Result<ModelFiles> {
    use hf_hub::api::sync::Api;

    let api = Api::new().context("Failed to initialize HuggingFace Hub client")?;
    let repo = api.model(repo_id.to_string());

    resolve_with(|name| match repo.get(name) {
        Ok(path) => {
            debug!(file = name, path = %path.display(), "Fetched model file");
            Some(path)
        }
        Err(e) => {
            debug!(file = name, error = %e, "Model file not available");
            None
        }
    })
}

/// Builds [`ModelFiles`] from a lookup that returns a local path for a file
/// name in the model repository, or `None` when the file does not exist.
fn resolve_with<F>(mut fetch: F) -> Result<ModelFiles>
where
    F: FnMut(&str) -> Option<PathBuf>,
{
    let model = ONNX_MODEL_FILES
        .iter()
        .find_map(|name| fetch(*name))
        .with_context(|| format!("No ONNX weights found (looked for {:?})", ONNX_MODEL_FILES))?;

    let tokenizer = fetch(TOKENIZER_FILE)
        .with_context(|| format!("Missing {}", TOKENIZER_FILE))?;

    let max_seq_length = match fetch(SENTENCE_CONFIG_FILE) {
        Some(path) => read_json::<SentenceConfig>(&path)?
            .max_seq_length
            .unwrap_or(DEFAULT_MAX_SEQ_LENGTH),
        None => DEFAULT_MAX_SEQ_LENGTH,
    };

    let normalize = match fetch(MODULES_FILE) {
        Some(path) => read_json::<Vec<PipelineModule>>(&path)?
            .iter()
            .any(|m| m.kind == NORMALIZE_MODULE),
        None => false,
    };

    Ok(ModelFiles {
        model,
        tokenizer,
        max_seq_length,
        normalize,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
