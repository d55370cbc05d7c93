use std::sync::Arc;

use tracing::instrument;

use docseek_core::config::RetrievalConfig;
use docseek_core::error::{ensure_alpha, ensure_top_k, Error, Result};
use docseek_core::traits::{Embedder, Retriever};
use docseek_core::types::{ChunkRecord, FusedHit, SearchHit};
use docseek_text::{Bm25Params, SparseIndex};
use docseek_vector::DenseIndex;

use crate::fusion::fuse;

/// Sparse and dense retrievers over the same chunk set, queried together and
/// fused into one ranking.
pub struct HybridSearchEngine<S = SparseIndex, D = DenseIndex>
where
    S: Retriever,
    D: Retriever,
{
    sparse: Arc<S>,
    dense: Arc<D>,
}

impl HybridSearchEngine<SparseIndex, DenseIndex> {
    /// Index `chunks` into both retrievers.
    ///
    /// An empty chunk list is fine and produces an engine whose queries
    /// return nothing.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub fn build(chunks: &[ChunkRecord], embedder: Arc<dyn Embedder>, config: &RetrievalConfig) -> Result<Self> {
        config.validate()?;
        let sparse = SparseIndex::build(chunks, Bm25Params::new(config.k1, config.b)?);
        let dense = DenseIndex::build(chunks, embedder, config.embed_batch_size)?;
        if sparse.len() != dense.len() {
            tracing::debug!(sparse = sparse.len(), dense = dense.len(), "indexes hold different chunk counts");
        }
        tracing::info!(sparse = sparse.len(), dense = dense.len(), "hybrid engine ready");
        Ok(Self::new(sparse, dense))
    }
}

impl<S, D> HybridSearchEngine<S, D>
where
    S: Retriever,
    D: Retriever,
{
    pub fn new(sparse: S, dense: D) -> Self {
        Self { sparse: Arc::new(sparse), dense: Arc::new(dense) }
    }

    pub fn sparse(&self) -> &S { &self.sparse }

    pub fn dense(&self) -> &D { &self.dense }

    /// True when neither retriever holds a chunk.
    pub fn is_empty(&self) -> bool { self.sparse.is_empty() && self.dense.is_empty() }

    /// Query both retrievers for `top_k` candidates each and fuse them.
    ///
    /// Parameters are checked before any retrieval work, so a bad `alpha`
    /// fails even on an empty engine.
    #[instrument(skip(self), level = "debug")]
    pub fn query(&self, text: &str, top_k: usize, alpha: f32) -> Result<Vec<FusedHit>> {
        ensure_top_k(top_k)?;
        ensure_alpha(alpha)?;
        if self.is_empty() {
            return Ok(vec![]);
        }
        let dense = self.dense.search(text, top_k)?;
        let sparse = self.sparse.search(text, top_k)?;
        finish(&dense, &sparse, alpha, top_k)
    }
}

impl<S, D> HybridSearchEngine<S, D>
where
    S: Retriever + 'static,
    D: Retriever + 'static,
{
    /// Like [`query`](Self::query), with the two searches running on the
    /// blocking pool at the same time.
    pub async fn query_concurrent(&self, text: &str, top_k: usize, alpha: f32) -> Result<Vec<FusedHit>> {
        ensure_top_k(top_k)?;
        ensure_alpha(alpha)?;
        if self.is_empty() {
            return Ok(vec![]);
        }
        let dense_task = {
            let dense = Arc::clone(&self.dense);
            let query = text.to_string();
            tokio::task::spawn_blocking(move || dense.search(&query, top_k))
        };
        let sparse_task = {
            let sparse = Arc::clone(&self.sparse);
            let query = text.to_string();
            tokio::task::spawn_blocking(move || sparse.search(&query, top_k))
        };
        let (dense, sparse) = tokio::try_join!(dense_task, sparse_task)
            .map_err(|e| Error::Task(format!("retrieval task failed: {e}")))?;
        finish(&dense?, &sparse?, alpha, top_k)
    }
}

fn finish(dense: &[SearchHit], sparse: &[SearchHit], alpha: f32, top_k: usize) -> Result<Vec<FusedHit>> {
    let fused = fuse(dense, sparse, alpha, top_k)?;
    tracing::debug!(dense = dense.len(), sparse = sparse.len(), fused = fused.len(), "fused results");
    Ok(fused)
}
