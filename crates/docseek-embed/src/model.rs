use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use docseek_core::traits::Embedder;

use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence-transformer style encoder: BERT forward pass, masked mean
/// pooling, L2 normalization (e.g. `all-MiniLM-L6-v2`).
///
/// The model directory must hold `config.json`, `tokenizer.json` and either
/// `model.safetensors` or `pytorch_model.bin`.
pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    dim: usize,
}

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = encoder_device();
        tracing::info!(device = ?device, "loading sentence encoder from {}", model_dir.display());
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config_str = std::fs::read_to_string(&config_path).with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_str).context("Failed to parse BERT config")?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config).context("Failed to initialize BERT model from weights")?;
        tracing::info!(hidden_size = config.hidden_size, layers = config.num_hidden_layers, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, max_len, dim: config.hidden_size })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(vec![]); }
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        tracing::debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(rows)
    }
}

impl Embedder for SentenceEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { self.embed(texts) }
}

fn encoder_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(err) => tracing::warn!(error = %err, "Metal device unavailable, running the encoder on CPU"),
        }
    }
    Device::Cpu
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return candle_core::safetensors::load(&safetensors, device)
            .with_context(|| format!("Failed to load {}", safetensors.display()));
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle).with_context(|| format!("Failed to load {}", pickle.display()))?;
    weights
        .into_iter()
        .map(|(name, tensor)| -> Result<(String, Tensor)> { Ok((name, tensor.to_device(device)?)) })
        .collect()
}

/// Pick the model directory: `MODEL_DIR` wins when it exists, then the
/// configured directory.
pub fn resolve_model_dir(configured: &Path) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() { tracing::info!("using MODEL_DIR: {}", p.display()); return Ok(p); }
    }
    if configured.exists() { return Ok(configured.to_path_buf()); }
    Err(anyhow!("Could not locate sentence encoder directory {} (set MODEL_DIR or embedding.model_dir)", configured.display()))
}
