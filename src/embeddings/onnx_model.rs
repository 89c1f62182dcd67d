// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence-transformer exported to ONNX (all-MiniLM-L6-v2 by default)
//! through ONNX Runtime and reproduces the sentence pipeline around it:
//! - BERT tokenization with truncation to the model's max sequence length
//! - Mean pooling over token embeddings, weighted by the attention mask
//! - L2 normalization when the model declares a Normalize module
//!
//! The output dimension is read from the model at load time rather than
//! assumed, so any BERT-style export with a `[batch, seq_len, hidden]` output
//! works.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, ArrayD, ArrayView2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::embeddings::hub::{resolve_model_files, ModelFiles};
use crate::embeddings::{Embedder, EmbeddingError, ModelLoader};

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// A session run needs exclusive access, so the session sits behind a mutex.
/// The tokenizer is shared read-only.
pub struct OnnxEmbeddingModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_name: String,
    dimension: usize,
    max_length: usize,
    normalize: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the ONNX session and tokenizer described by `files`
    ///
    /// Runs one validation inference to check the output layout and learn the
    /// embedding dimension.
    ///
    /// # Errors
    /// Returns error if:
    /// - The ONNX model or tokenizer cannot be loaded
    /// - ONNX Runtime initialization fails
    /// - The model output is not `[batch, seq_len, hidden]`
    pub fn load(model_name: impl Into<String>, files: &ModelFiles) -> Result<Self> {
        let model_name = model_name.into();
        info!(model = %model_name, path = %files.model.display(), "Initializing ONNX embedding model");

        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(&files.model)
            .with_context(|| {
                format!("Failed to load ONNX model from {}", files.model.display())
            })?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: files.max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        // Validation pass: confirms the output layout and yields the hidden size
        let dimension = {
            let encoding = tokenizer
                .encode("validation test", true)
                .map_err(|e| anyhow!("Tokenizer validation failed: {}", e))?;
            let output = run_session(&mut session, &encoding)?;
            let shape = output.shape();
            if shape.len() != 3 || shape[2] == 0 {
                anyhow::bail!(
                    "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden])",
                    shape
                );
            }
            shape[2]
        };

        info!(
            model = %model_name,
            dimension,
            max_length = files.max_seq_length,
            normalize = files.normalize,
            "✅ ONNX embedding model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_name,
            dimension,
            max_length: files.max_seq_length,
            normalize: files.normalize,
        })
    }

    /// Generates the sentence embedding for one text
    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let output = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow!("Session lock poisoned: {}", e))?;
            run_session(&mut session, &encoding)?
        };

        let tokens = output
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .context("Model output is not [seq_len, hidden] per item")?;

        let mut embedding = mean_pool(tokens, encoding.get_attention_mask());
        if self.normalize {
            l2_normalize(&mut embedding);
        }

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        debug!(tokens = encoding.len(), "Generated embedding");
        Ok(embedding)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Embedder for OnnxEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.encode(text)
            .map_err(|e| EmbeddingError::inference(format!("{:#}", e)))
    }
}

/// Runs one tokenized sequence and returns the token-level output
/// `[1, seq_len, hidden]`.
fn run_session(session: &mut Session, encoding: &Encoding) -> Result<ArrayD<f32>> {
    let len = encoding.len();
    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

    let input_ids_array = Array2::from_shape_vec((1, len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((1, len), attention_mask)
        .context("Failed to create attention_mask array")?;
    let token_type_ids_array = Array2::from_shape_vec((1, len), token_type_ids)
        .context("Failed to create token_type_ids array")?;

    let outputs = session.run(ort::inputs![
        "input_ids" => Value::from_array(input_ids_array)?,
        "attention_mask" => Value::from_array(attention_mask_array)?,
        "token_type_ids" => Value::from_array(token_type_ids_array)?
    ])?;

    // Index [0] rather than by name: exports disagree on the output name
    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    Ok(output.to_owned())
}

/// Averages token embeddings `[seq_len, hidden]`, counting only positions
/// whose attention mask is set.
pub fn mean_pool(token_embeddings: ArrayView2<'_, f32>, attention_mask: &[u32]) -> Vec<f32> {
    let mut pooled = vec![0.0f32; token_embeddings.ncols()];
    let mut sum_mask = 0.0f32;

    for (row, &mask) in token_embeddings.outer_iter().zip(attention_mask) {
        let weight = mask as f32;
        sum_mask += weight;
        for (acc, value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * weight;
        }
    }

    let denom = sum_mask.max(1e-9);
    for value in &mut pooled {
        *value /= denom;
    }
    pooled
}

/// Scales `vector` to unit length; the zero vector is left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Production [`ModelLoader`]: resolves the identifier to files and loads
/// them with ONNX Runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxModelLoader;

impl ModelLoader for OnnxModelLoader {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        let files = resolve_model_files(model_id)?;
        let model = OnnxEmbeddingModel::load(model_id, &files)
            .map_err(|e| EmbeddingError::model_load(model_id, format!("{:#}", e)))?;
        Ok(Arc::new(model))
    }
}
