use crate::error::Result;
use crate::types::{SearchHit, SourceKind};

/// Turns text into fixed-width vectors.
///
/// Implementations must return one row per input, in input order, all rows
/// of the same width, and must be deterministic for identical text.
pub trait Embedder: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// A built, read-only index answering ranked queries.
pub trait Retriever: Send + Sync {
    fn source(&self) -> SourceKind;
    /// Number of chunks that survived the build.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;
}
