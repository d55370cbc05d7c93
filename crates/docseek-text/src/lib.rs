//! docseek-text
//!
//! In-memory Okapi BM25 index over chunk text. Tokenization reuses tantivy's
//! analyzer pipeline; scoring is computed exactly (no fieldnorm quantization)
//! so results are reproducible across corpora of any size.
pub mod analyzer;
pub mod bm25;

pub use analyzer::tokenize;
pub use bm25::{Bm25Params, SparseIndex};
