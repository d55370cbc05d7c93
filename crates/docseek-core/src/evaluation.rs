//! Offline retrieval metrics.

use std::collections::HashSet;

/// Fraction of `relevant` ids that appear among the first `k` `retrieved` ids.
///
/// Returns `0.0` when `k == 0` or the relevant set is empty. Duplicate
/// retrieved ids are counted once per occurrence.
pub fn recall_at_k<R, S>(retrieved: &[R], relevant: &[S], k: usize) -> f64
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    if k == 0 {
        return 0.0;
    }
    let relevant: HashSet<&str> = relevant.iter().map(|id| id.as_ref()).collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|id| {
            let id: &str = (*id).as_ref();
            relevant.contains(id)
        })
        .count();
    hits as f64 / relevant.len() as f64
}

/// Mean of per-query recall@k; `0.0` for an empty query set.
pub fn mean_recall_at_k<R, S>(runs: &[(Vec<R>, Vec<S>)], k: usize) -> f64
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    if runs.is_empty() {
        return 0.0;
    }
    let total: f64 = runs.iter().map(|(retrieved, relevant)| recall_at_k(retrieved, relevant, k)).sum();
    total / runs.len() as f64
}
