use std::sync::Arc;

use tracing::instrument;

use docseek_core::error::{ensure_top_k, Error, Result};
use docseek_core::traits::{Embedder, Retriever};
use docseek_core::types::{ChunkRecord, SearchHit, SourceKind};

use crate::embed_batches::embed_in_batches;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Squared Euclidean distance, accumulated in single precision.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Bounded similarity in `(0, 1]`, strictly decreasing in distance.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// `N × dim` row-major vectors with chunk metadata aligned by row.
struct DenseMatrix {
    dim: usize,
    data: Vec<f32>,
    chunks: Vec<ChunkRecord>,
}

impl DenseMatrix {
    fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}

enum IndexState {
    Empty,
    Built(DenseMatrix),
}

pub struct DenseIndex {
    embedder: Arc<dyn Embedder>,
    state: IndexState,
}

impl DenseIndex {
    /// Embed every chunk with non-blank text and store the vectors.
    ///
    /// Blank chunks are skipped. Embedder failures, row-count mismatches and
    /// ragged widths abort the build.
    #[instrument(skip_all, fields(chunks = chunks.len(), batch_size = batch_size))]
    pub fn build(chunks: &[ChunkRecord], embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::invalid_config("embedding batch size must be positive"));
        }
        let kept: Vec<ChunkRecord> = chunks.iter().filter(|c| !c.text.trim().is_empty()).cloned().collect();
        let dropped = chunks.len() - kept.len();
        if dropped > 0 { tracing::warn!(dropped, "blank chunks were left out of the dense index"); }
        if kept.is_empty() {
            tracing::info!("dense index is empty");
            return Ok(Self { embedder, state: IndexState::Empty });
        }

        let texts: Vec<String> = kept.iter().map(|c| c.text.clone()).collect();
        let rows = embed_in_batches(embedder.as_ref(), &texts, batch_size)?;
        let dim = rows.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(Error::Embedding("embedder returned zero-width vectors".to_string()));
        }
        let data: Vec<f32> = rows.into_iter().flatten().collect();
        tracing::info!(indexed = kept.len(), dim, "dense index built");
        Ok(Self { embedder, state: IndexState::Built(DenseMatrix { dim, data, chunks: kept }) })
    }

    pub fn len(&self) -> usize {
        match &self.state { IndexState::Empty => 0, IndexState::Built(m) => m.chunks.len() }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Vector width, once built.
    pub fn dim(&self) -> Option<usize> {
        match &self.state { IndexState::Empty => None, IndexState::Built(m) => Some(m.dim) }
    }

    /// The `top_k` chunks nearest to `query`, most similar first. Equal
    /// distances keep indexing order.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        ensure_top_k(top_k)?;
        let IndexState::Built(matrix) = &self.state else { return Ok(vec![]) };

        let query_vec = self
            .embedder
            .embed_batch(&[query.to_string()])
            .map_err(|e| Error::embedding(&e))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("embedder returned no vector for the query".to_string()))?;
        if query_vec.len() != matrix.dim {
            return Err(Error::Embedding(format!("query dim mismatch: got {} expected {}", query_vec.len(), matrix.dim)));
        }

        let mut scored: Vec<(usize, f32)> =
            (0..matrix.chunks.len()).map(|i| (i, squared_l2(&query_vec, matrix.row(i)))).collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (idx, distance))| {
                let chunk = &matrix.chunks[idx];
                SearchHit {
                    rank,
                    score: similarity_from_distance(distance),
                    source: SourceKind::Dense,
                    doc_id: chunk.doc_id.clone(),
                    chunk_id: chunk.chunk_id.clone(),
                    text: chunk.text.clone(),
                }
            })
            .collect();
        tracing::debug!(hits = hits.len(), "dense search");
        Ok(hits)
    }
}

impl Retriever for DenseIndex {
    fn source(&self) -> SourceKind { SourceKind::Dense }
    fn len(&self) -> usize { Self::len(self) }
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> { Self::search(self, query, top_k) }
}
