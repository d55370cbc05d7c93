//! Domain types shared by the sparse, dense and hybrid engines.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A chunk of a source document, consumed once by each index's build step.
///
/// - `doc_id`: stable identity of the source document/page
/// - `chunk_id`: unique across the whole corpus, stable across rebuilds
/// - `text`: the payload; blank text is dropped by both indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub text: String,
}

impl ChunkRecord {
    pub fn new(doc_id: impl Into<String>, chunk_id: impl Into<ChunkId>, text: impl Into<String>) -> Self {
        Self { doc_id: doc_id.into(), chunk_id: chunk_id.into(), text: text.into() }
    }
}

/// One extracted page of a source document, before chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub doc_id: String,
    pub text: String,
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Dense,
    Sparse,
}

/// A single-index result.
///
/// `score` is engine-specific (raw BM25, or `1 / (1 + l2)` similarity) but
/// higher is always better. `rank` is 0-based within the returned list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub rank: usize,
    pub score: f32,
    pub source: SourceKind,
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub text: String,
}

/// A blended result. Component scores are min-max normalized into `[0, 1]`;
/// a side that did not return the chunk contributes `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    pub rank: usize,
    pub score: f32,
    pub dense_score: f32,
    pub sparse_score: f32,
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub text: String,
}
