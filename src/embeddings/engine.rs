// engine.rs — Candle BERT embedding engine with attention-mask-aware mean pooling.
//
// Loads all-MiniLM-L6-v2 from safetensors and produces 384-dim sentence embeddings
// the way the sentence-transformers pipeline does: mean pooling over non-padding
// tokens, then L2 normalization.

use std::path::Path;

use anyhow::{bail, Context};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{Tokenizer, TruncationParams};

use crate::config;
use crate::config::embedding::{CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};

/// The embedding engine holds the loaded model and tokenizer.
pub struct EmbeddingEngine {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingEngine {
    /// Load the model from a local directory containing model.safetensors,
    /// tokenizer.json, and config.json.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let config_path = model_dir.join(CONFIG_FILE);
        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("read {}", config_path.display()))?;
        let config: BertConfig =
            serde_json::from_str(&config_str).with_context(|| format!("parse {}", config_path.display()))?;

        log::info!(
            "Loading {}: hidden_size={}, layers={}, heads={}",
            config::embedding::EMBEDDING_MODEL_NAME,
            config.hidden_size,
            config.num_hidden_layers,
            config.num_attention_heads,
        );

        if config.hidden_size != config::embedding::EMBEDDING_DIMS {
            bail!(
                "model hidden_size {} does not match expected embedding dims {}",
                config.hidden_size,
                config::embedding::EMBEDDING_DIMS
            );
        }

        let weights_path = model_dir.join(WEIGHTS_FILE);
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.clone()], DType::F32, &device)
                .with_context(|| format!("load weights from {}", weights_path.display()))?
        };

        let model = BertModel::load(vb, &config).context("load BERT model")?;

        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        // Single sequence: no padding. Truncation happens in the tokenizer so [SEP] is kept.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config::embedding::MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("configure tokenizer truncation: {e}"))?;

        log::info!("Embedding model loaded successfully (dims={})", config.hidden_size);

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Generate a sentence embedding for the given text.
    /// Returns a Vec<f32> of `EMBEDDING_DIMS` dimensions with unit L2 norm.
    ///
    /// Empty input is not special-cased; it encodes to `[CLS] [SEP]`.
    pub fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let token_ids = encoding.get_ids();
        let attention_mask = encoding.get_attention_mask();
        log::debug!("Tokenized {} into {} tokens", crate::vector::input_size(text), token_ids.len());

        // [1, seq_len]
        let token_ids_t = Tensor::new(
            token_ids.iter().map(|&id| id as i64).collect::<Vec<_>>().as_slice(),
            &self.device,
        )?
        .unsqueeze(0)?;

        let attention_mask_t = Tensor::new(
            attention_mask.iter().map(|&m| m as i64).collect::<Vec<_>>().as_slice(),
            &self.device,
        )?
        .unsqueeze(0)?;

        let token_type_ids = token_ids_t.zeros_like()?;

        // [1, seq_len, hidden_size]
        let output = self
            .model
            .forward(&token_ids_t, &token_type_ids, Some(&attention_mask_t))
            .context("BERT forward pass")?;

        let embedding = mean_pooling(&output, &attention_mask_t)?;
        let embedding = l2_normalize(&embedding)?;

        let emb_vec: Vec<f32> = embedding.squeeze(0)?.to_vec1()?;

        if emb_vec.len() != config::embedding::EMBEDDING_DIMS {
            bail!(
                "unexpected embedding dims: got {}, expected {}",
                emb_vec.len(),
                config::embedding::EMBEDDING_DIMS
            );
        }

        Ok(emb_vec)
    }
}

/// Attention-mask-aware mean pooling.
///
/// input_embeds: [batch, seq_len, hidden_size]
/// attention_mask: [batch, seq_len] (1 for real tokens, 0 for padding)
/// output: [batch, hidden_size]
fn mean_pooling(input_embeds: &Tensor, attention_mask: &Tensor) -> anyhow::Result<Tensor> {
    // [batch, seq_len] → [batch, seq_len, hidden_size]
    let mask_expanded = attention_mask
        .to_dtype(DType::F32)?
        .unsqueeze(2)?
        .broadcast_as(input_embeds.shape())?;

    let sum_embeddings = (input_embeds * &mask_expanded)?.sum(1)?;
    let sum_mask = mask_expanded.sum(1)?.clamp(config::embedding::MASK_SUM_EPS, f64::MAX)?;

    Ok((sum_embeddings / sum_mask)?)
}

/// L2 normalize a [batch, dims] tensor along the last dimension.
fn l2_normalize(tensor: &Tensor) -> anyhow::Result<Tensor> {
    let norm = tensor.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.clamp(config::embedding::NORM_EPS, f64::MAX)?;
    Ok(tensor.broadcast_div(&norm)?)
}
