//! Score fusion for hybrid search.
//!
//! BM25 scores are unbounded and corpus-dependent while dense similarities
//! live in `(0, 1]`, so neither can be added to the other directly. Each list
//! is min-max normalized on its own, the two are joined on `chunk_id`, and the
//! normalized scores are blended linearly:
//!
//! ```text
//! score = alpha * dense_norm + (1 - alpha) * sparse_norm
//! ```
//!
//! A chunk returned by only one side gets `0.0` for the other side.

use std::collections::HashMap;

use docseek_core::error::{ensure_alpha, ensure_top_k, Result};
use docseek_core::types::{FusedHit, SearchHit};

/// Weight on the dense signal when the caller does not choose one.
pub const DEFAULT_ALPHA: f32 = 0.6;

/// Rescale `scores` linearly onto `[0, 1]`.
///
/// When every score is equal (including empty and single-element input) all
/// normalized scores are `0.0`: a list that cannot tell its entries apart
/// contributes nothing to the ranking.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if scores.is_empty() || range <= 0.0 || !range.is_finite() {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| (s - min) / range).collect()
}

struct Candidate<'a> {
    hit: &'a SearchHit,
    dense: f32,
    sparse: f32,
    /// Position in each input list; the list length when absent from it.
    dense_pos: usize,
    sparse_pos: usize,
}

/// Blend a dense and a sparse result list into at most `top_k` fused hits.
///
/// Candidates are the union of both lists keyed by `chunk_id`. Exact score
/// ties are ordered by the alpha-weighted list positions, then by first-seen
/// order (dense list first), so `alpha = 0.0` reproduces the sparse ranking and
/// `alpha = 1.0` the dense one. If a list repeats a `chunk_id`, its first
/// (best-ranked) entry wins.
pub fn fuse(dense: &[SearchHit], sparse: &[SearchHit], alpha: f32, top_k: usize) -> Result<Vec<FusedHit>> {
    ensure_alpha(alpha)?;
    ensure_top_k(top_k)?;

    let dense_norm = min_max_normalize(&dense.iter().map(|h| h.score).collect::<Vec<_>>());
    let sparse_norm = min_max_normalize(&sparse.iter().map(|h| h.score).collect::<Vec<_>>());

    let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(dense.len() + sparse.len());
    let mut by_id: HashMap<&str, usize> = HashMap::new();
    for (pos, (hit, norm)) in dense.iter().zip(dense_norm).enumerate() {
        if by_id.contains_key(hit.chunk_id.as_str()) { continue; }
        by_id.insert(&hit.chunk_id, candidates.len());
        candidates.push(Candidate { hit, dense: norm, sparse: 0.0, dense_pos: pos, sparse_pos: sparse.len() });
    }
    for (pos, (hit, norm)) in sparse.iter().zip(sparse_norm).enumerate() {
        match by_id.get(hit.chunk_id.as_str()) {
            Some(&idx) => {
                let candidate = &mut candidates[idx];
                if candidate.sparse_pos == sparse.len() {
                    candidate.sparse = norm;
                    candidate.sparse_pos = pos;
                }
            }
            None => {
                by_id.insert(&hit.chunk_id, candidates.len());
                candidates.push(Candidate { hit, dense: 0.0, sparse: norm, dense_pos: dense.len(), sparse_pos: pos });
            }
        }
    }

    let alpha = f64::from(alpha);
    let mut scored: Vec<(f64, FusedHit)> = candidates
        .into_iter()
        .map(|c| {
            let score = alpha * f64::from(c.dense) + (1.0 - alpha) * f64::from(c.sparse);
            let tie = alpha * c.dense_pos as f64 + (1.0 - alpha) * c.sparse_pos as f64;
            let hit = FusedHit {
                rank: 0,
                score: score as f32,
                dense_score: c.dense,
                sparse_score: c.sparse,
                doc_id: c.hit.doc_id.clone(),
                chunk_id: c.hit.chunk_id.clone(),
                text: c.hit.text.clone(),
            };
            (tie, hit)
        })
        .collect();
    // stable: equal score and tie keep first-seen order
    scored.sort_by(|(tie_a, a), (tie_b, b)| b.score.total_cmp(&a.score).then_with(|| tie_a.total_cmp(tie_b)));
    scored.truncate(top_k);
    let fused = scored
        .into_iter()
        .enumerate()
        .map(|(rank, (_, hit))| FusedHit { rank, ..hit })
        .collect();
    Ok(fused)
}
