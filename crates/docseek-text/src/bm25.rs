use std::collections::HashMap;

use tracing::instrument;

use docseek_core::error::{ensure_top_k, Error, Result};
use docseek_core::traits::Retriever;
use docseek_core::types::{ChunkRecord, SearchHit, SourceKind};

use crate::analyzer::tokenize;

/// Okapi BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
	pub k1: f32,
	pub b: f32,
}

impl Default for Bm25Params {
	fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

impl Bm25Params {
	pub fn new(k1: f32, b: f32) -> Result<Self> {
		if !k1.is_finite() || k1 < 0.0 {
			return Err(Error::invalid_config(format!("k1 must be a finite non-negative number, got {k1}")));
		}
		if !(0.0..=1.0).contains(&b) {
			return Err(Error::invalid_config(format!("b must be within [0, 1], got {b}")));
		}
		Ok(Self { k1, b })
	}
}

#[derive(Debug, Clone, Copy)]
struct Posting {
	chunk: usize,
	tf: u32,
}

/// Corpus statistics of the chunks that produced at least one token.
/// All per-chunk vectors are aligned by indexing position.
#[derive(Debug)]
struct Bm25Corpus {
	chunks: Vec<ChunkRecord>,
	doc_lens: Vec<u32>,
	avg_doc_len: f64,
	/// term -> chunks containing it; the list length is the document frequency.
	postings: HashMap<String, Vec<Posting>>,
}

impl Bm25Corpus {
	fn idf(&self, doc_freq: usize) -> f64 {
		let n = self.chunks.len() as f64;
		let df = doc_freq as f64;
		(1.0 + (n - df + 0.5) / (df + 0.5)).ln()
	}

	fn scores(&self, query_tokens: &[String], params: Bm25Params) -> Vec<f64> {
		let k1 = f64::from(params.k1);
		let b = f64::from(params.b);
		let mut scores = vec![0.0f64; self.chunks.len()];
		for term in query_tokens {
			let Some(postings) = self.postings.get(term) else { continue };
			let idf = self.idf(postings.len());
			for posting in postings {
				let tf = f64::from(posting.tf);
				let len_norm = 1.0 - b + b * f64::from(self.doc_lens[posting.chunk]) / self.avg_doc_len;
				scores[posting.chunk] += idf * (tf * (k1 + 1.0)) / (tf + k1 * len_norm);
			}
		}
		scores
	}
}

#[derive(Debug)]
enum IndexState {
	Empty,
	Built(Bm25Corpus),
}

/// Lexical index answering BM25 queries. Immutable once built; rebuild by
/// constructing a new value.
#[derive(Debug)]
pub struct SparseIndex {
	params: Bm25Params,
	state: IndexState,
}

impl SparseIndex {
	/// Index every chunk that yields at least one token. Chunks without
	/// tokens are skipped, not rejected; if none survive the index is empty.
	#[instrument(skip_all, fields(chunks = chunks.len()))]
	pub fn build(chunks: &[ChunkRecord], params: Bm25Params) -> Self {
		let mut kept = Vec::new();
		let mut doc_lens = Vec::new();
		let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
		for chunk in chunks {
			let tokens = tokenize(&chunk.text);
			if tokens.is_empty() {
				tracing::debug!(chunk_id = %chunk.chunk_id, "no tokens, skipped by sparse index");
				continue;
			}
			let position = kept.len();
			let mut term_freqs: HashMap<String, u32> = HashMap::new();
			for token in &tokens { *term_freqs.entry(token.clone()).or_insert(0) += 1; }
			for (term, tf) in term_freqs { postings.entry(term).or_default().push(Posting { chunk: position, tf }); }
			doc_lens.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));
			kept.push(chunk.clone());
		}
		let dropped = chunks.len() - kept.len();
		if dropped > 0 { tracing::warn!(dropped, "chunks without tokens were left out of the sparse index"); }
		if kept.is_empty() {
			tracing::info!("sparse index is empty");
			return Self { params, state: IndexState::Empty };
		}
		let total: u64 = doc_lens.iter().map(|&l| u64::from(l)).sum();
		let avg_doc_len = total as f64 / doc_lens.len() as f64;
		tracing::info!(indexed = kept.len(), terms = postings.len(), avg_doc_len, "sparse index built");
		Self { params, state: IndexState::Built(Bm25Corpus { chunks: kept, doc_lens, avg_doc_len, postings }) }
	}

	pub fn params(&self) -> Bm25Params { self.params }

	pub fn len(&self) -> usize {
		match &self.state { IndexState::Empty => 0, IndexState::Built(corpus) => corpus.chunks.len() }
	}

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// Score every indexed chunk against `query` and return the best `top_k`,
	/// highest first. Equal scores keep indexing order.
	#[instrument(skip(self), level = "debug")]
	pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
		ensure_top_k(top_k)?;
		let IndexState::Built(corpus) = &self.state else { return Ok(vec![]) };
		let query_tokens = tokenize(query);
		if query_tokens.is_empty() { return Ok(vec![]); }

		let scores = corpus.scores(&query_tokens, self.params);
		let mut order: Vec<usize> = (0..scores.len()).collect();
		// sort_by is stable, so ties stay in indexing order
		order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
		let hits = order
			.into_iter()
			.take(top_k)
			.enumerate()
			.map(|(rank, idx)| {
				let chunk = &corpus.chunks[idx];
				SearchHit {
					rank,
					score: scores[idx] as f32,
					source: SourceKind::Sparse,
					doc_id: chunk.doc_id.clone(),
					chunk_id: chunk.chunk_id.clone(),
					text: chunk.text.clone(),
				}
			})
			.collect::<Vec<_>>();
		tracing::debug!(terms = query_tokens.len(), hits = hits.len(), "sparse search");
		Ok(hits)
	}
}

impl Retriever for SparseIndex {
	fn source(&self) -> SourceKind { SourceKind::Sparse }
	fn len(&self) -> usize { Self::len(self) }
	fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> { Self::search(self, query, top_k) }
}
