//! Local embeddings via all-MiniLM-L6-v2 running on Candle
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::{EmbeddingProvider, LOCAL_DIMENSIONS};
use crate::errors::{Result, SymbiontError};

const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const MAX_SEQUENCE_LENGTH: usize = 256;
const PROVIDER: &str = "local";

fn model_err(e: impl std::fmt::Display) -> SymbiontError {
    SymbiontError::embedding(PROVIDER, e.to_string())
}

/// Sentence-transformer embedding backend (CPU)
#[derive(Clone)]
pub struct LocalEmbeddings {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
}

impl LocalEmbeddings {
    /// Download (first use only) and load the model. Blocking.
    pub fn new() -> Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().map_err(model_err)?;
        let repo = api.repo(Repo::new(MODEL_ID.to_string(), RepoType::Model));

        let config_path = repo.get("config.json").map_err(model_err)?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(model_err)?;
        let weights_path = repo.get("model.safetensors").map_err(model_err)?;

        let config_contents = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_contents)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(model_err)?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(model_err)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(model_err)?
        };
        let model = BertModel::load(vb, &config).map_err(model_err)?;

        debug!(model = MODEL_ID, "local embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
        })
    }

    /// Synchronous forward pass over a batch
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(model_err)?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = encodings.len();

        let mut padded_ids = vec![0u32; batch_size * max_len];
        let mut padded_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            padded_ids[i * max_len..i * max_len + ids.len()].copy_from_slice(ids);
            padded_mask[i * max_len..i * max_len + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(padded_ids, (batch_size, max_len), &self.device)
            .map_err(model_err)?;
        let attention_mask = Tensor::from_vec(padded_mask, (batch_size, max_len), &self.device)
            .map_err(model_err)?;
        let token_type_ids = token_ids.zeros_like().map_err(model_err)?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))
            .map_err(model_err)?;

        let pooled = Self::mean_pool(&hidden, &attention_mask).map_err(model_err)?;
        let normalized = Self::l2_normalize(&pooled).map_err(model_err)?;

        normalized.to_vec2::<f32>().map_err(model_err)
    }

    /// Mean pooling with attention mask
    fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let mask = attention_mask
            .unsqueeze(2)?
            .expand(hidden.shape())?
            .to_dtype(hidden.dtype())?;

        let summed = (hidden * &mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        summed.broadcast_div(&counts)
    }

    fn l2_normalize(v: &Tensor) -> candle_core::Result<Tensor> {
        let norm = v.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        v.broadcast_div(&norm)
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| model_err("model returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let engine = self.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || engine.encode(&texts))
            .await
            .map_err(model_err)?
    }

    fn dimensions(&self) -> usize {
        LOCAL_DIMENSIONS
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
