//! docseek-embed
//!
//! Embedding capabilities for the dense index: a candle-backed sentence
//! encoder and a hashing embedder that needs no model files.
use anyhow::{ensure, Result};
use std::sync::Arc;

use docseek_core::config::EmbeddingConfig;
use docseek_core::traits::Embedder;

pub mod hashing;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use hashing::HashEmbedder;
pub use model::SentenceEmbedder;
pub use pool::masked_mean_l2;

/// Build the embedder described by `config`.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` (or `embedding.use_fake = true`) selects the
/// [`HashEmbedder`] for fast, deterministic runs.
pub fn default_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let env_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if config.use_fake || env_fake {
        ensure!(config.fake_dim > 0, "embedding.fake_dim must be positive");
        let embedder = HashEmbedder::new(config.fake_dim);
        tracing::info!(dim = embedder.dim(), "using HashEmbedder");
        return Ok(Arc::new(embedder));
    }
    let model_dir = model::resolve_model_dir(&config.model_path())?;
    let embedder = SentenceEmbedder::load(&model_dir, config.max_len)?;
    tracing::info!(dim = embedder.dim(), max_len = config.max_len, "using SentenceEmbedder");
    Ok(Arc::new(embedder))
}
