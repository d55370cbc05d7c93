use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docseek_core::traits::Embedder;

/// Deterministic feature-hashing embedder for tests and offline development.
///
/// Each lowercase alphanumeric token is hashed into one of `dim` buckets; the
/// vector is L2-normalized. Texts sharing vocabulary land close together, so
/// rankings are meaningful without model weights. Text without tokens maps to
/// the zero vector. A zero width yields empty vectors, which the dense index
/// rejects at build time.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim } }

    pub fn dim(&self) -> usize { self.dim }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        if self.dim == 0 { return Vec::new(); }
        let mut v = vec![0f32; self.dim];
        let tokens = text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty());
        for (i, token) in tokens.enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 0.5 + val + (i % 3) as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
