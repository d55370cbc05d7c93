use std::collections::HashSet;
use std::sync::Arc;

use docseek_core::config::RetrievalConfig;
use docseek_core::error::{Error, Result};
use docseek_core::traits::Retriever;
use docseek_core::types::{ChunkRecord, FusedHit, SearchHit, SourceKind};
use docseek_embed::HashEmbedder;
use docseek_hybrid::{fuse, HybridSearchEngine, DEFAULT_ALPHA};
use docseek_text::Bm25Params;

fn hit(source: SourceKind, rank: usize, id: &str, score: f32) -> SearchHit {
    SearchHit { rank, score, source, doc_id: "doc".to_string(), chunk_id: id.to_string(), text: format!("text of {id}") }
}

fn hits(source: SourceKind, scored: &[(&str, f32)]) -> Vec<SearchHit> {
    scored.iter().enumerate().map(|(rank, (id, score))| hit(source, rank, id, *score)).collect()
}

/// Returns a fixed ranking whatever the query.
struct StaticRetriever {
    source: SourceKind,
    ranking: Vec<SearchHit>,
}

impl Retriever for StaticRetriever {
    fn source(&self) -> SourceKind { self.source }
    fn len(&self) -> usize { self.ranking.len() }
    fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        Ok(self.ranking.iter().take(top_k).cloned().collect())
    }
}

fn fixed_lists() -> (Vec<SearchHit>, Vec<SearchHit>) {
    let dense = hits(SourceKind::Dense, &[("a", 1.0), ("b", 0.75), ("c", 0.5)]);
    let sparse = hits(SourceKind::Sparse, &[("c", 8.0), ("d", 4.0), ("a", 2.0)]);
    (dense, sparse)
}

fn fused_ids(list: &[FusedHit]) -> Vec<&str> {
    list.iter().map(|h| h.chunk_id.as_str()).collect()
}

fn hit_ids(list: &[SearchHit]) -> Vec<&str> {
    list.iter().map(|h| h.chunk_id.as_str()).collect()
}

fn engine_over(chunks: &[ChunkRecord]) -> HybridSearchEngine {
    HybridSearchEngine::build(chunks, Arc::new(HashEmbedder::new(64)), &RetrievalConfig::default()).expect("build")
}

#[test]
fn blends_normalized_scores_over_the_union() {
    let (dense, sparse) = fixed_lists();
    let fused = fuse(&dense, &sparse, DEFAULT_ALPHA, 10).expect("fuse");

    // dense norms a=1 b=0.5 c=0, sparse norms c=1 d=1/3 a=0
    assert_eq!(fused_ids(&fused), vec!["a", "c", "b", "d"]);
    let expected = [0.6, 0.4, 0.3, 0.4 / 3.0];
    for (got, want) in fused.iter().zip(expected) {
        assert!((got.score - want).abs() < 1e-6, "{} got {} want {}", got.chunk_id, got.score, want);
    }
    let d = &fused[3];
    assert_eq!(d.dense_score, 0.0, "missing side counts as zero");
    assert_eq!(fused.iter().map(|h| h.rank).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn output_is_truncated_to_top_k() {
    let (dense, sparse) = fixed_lists();
    let fused = fuse(&dense, &sparse, DEFAULT_ALPHA, 3).expect("fuse");
    assert_eq!(fused_ids(&fused), vec!["a", "c", "b"]);
}

#[test]
fn alpha_extremes_reproduce_each_side() {
    let (dense, sparse) = fixed_lists();

    let dense_only = fuse(&dense, &sparse, 1.0, 10).expect("fuse");
    assert_eq!(fused_ids(&dense_only)[..dense.len()], hit_ids(&dense)[..]);

    let sparse_only = fuse(&dense, &sparse, 0.0, 10).expect("fuse");
    assert_eq!(fused_ids(&sparse_only)[..sparse.len()], hit_ids(&sparse)[..]);
}

#[test]
fn constant_lists_contribute_exact_zero() {
    let dense = hits(SourceKind::Dense, &[("a", 0.5), ("b", 0.5)]);
    let sparse = hits(SourceKind::Sparse, &[("b", 3.0), ("a", 1.0)]);
    let fused = fuse(&dense, &sparse, 0.5, 5).expect("fuse");
    assert!(fused.iter().all(|h| h.dense_score == 0.0));
    assert_eq!(fused[0].chunk_id, "b");
    assert_eq!(fused[1].score, 0.0);

    let single = fuse(&hits(SourceKind::Dense, &[("x", 0.9)]), &[], 0.7, 5).expect("fuse");
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].score, 0.0);
}

#[test]
fn exact_ties_follow_blended_list_positions() {
    let dense = hits(SourceKind::Dense, &[("a", 1.0), ("b", 1.0)]);
    let sparse = hits(SourceKind::Sparse, &[("c", 2.0), ("d", 2.0)]);
    let fused = fuse(&dense, &sparse, 0.5, 4).expect("fuse");
    assert!(fused.iter().all(|h| h.score == 0.0));
    // positions (dense, sparse) with absent = list length: a(0,2) c(2,0) b(1,2) d(2,1)
    assert_eq!(fused_ids(&fused), vec!["a", "c", "b", "d"]);
}

#[test]
fn tied_scores_keep_each_side_order_at_the_alpha_extremes() {
    let dense = hits(SourceKind::Dense, &[("c", 0.9), ("b", 0.5)]);
    let sparse = hits(SourceKind::Sparse, &[("a", 2.0), ("b", 0.0), ("c", 0.0)]);

    let sparse_only = fuse(&dense, &sparse, 0.0, 10).expect("fuse");
    assert_eq!(fused_ids(&sparse_only), vec!["a", "b", "c"]);

    let dense_only = fuse(&dense, &sparse, 1.0, 10).expect("fuse");
    assert_eq!(fused_ids(&dense_only), vec!["c", "b", "a"]);
}

#[test]
fn engine_at_alpha_extremes_matches_each_index_ranking() {
    let texts = ["valve valve", "pump housing", "seal ring gasket", "filter", "valve seat"];
    let chunks: Vec<ChunkRecord> =
        texts.iter().enumerate().map(|(i, t)| ChunkRecord::new("manual", format!("c{i}"), *t)).collect();
    let engine = engine_over(&chunks);

    let sparse = engine.sparse().search("valve", 5).expect("search");
    let fused = engine.query("valve", 5, 0.0).expect("query");
    assert_eq!(fused_ids(&fused), hit_ids(&sparse));

    let dense = engine.dense().search("valve", 5).expect("search");
    let fused = engine.query("valve", 5, 1.0).expect("query");
    assert_eq!(fused_ids(&fused), hit_ids(&dense));
}

#[test]
fn build_uses_the_configured_bm25_parameters() {
    let config = RetrievalConfig { k1: 1.2, b: 0.5, ..RetrievalConfig::default() };
    let engine = HybridSearchEngine::build(&[], Arc::new(HashEmbedder::new(8)), &config).expect("build");
    assert_eq!(engine.sparse().params(), Bm25Params::new(1.2, 0.5).expect("params"));
}

#[test]
fn empty_inputs_fuse_to_nothing() {
    assert!(fuse(&[], &[], DEFAULT_ALPHA, 5).expect("fuse").is_empty());
}

#[test]
fn invalid_fusion_parameters_fail_fast() {
    let (dense, sparse) = fixed_lists();
    for alpha in [-0.1, 1.5, f32::NAN] {
        assert!(matches!(fuse(&dense, &sparse, alpha, 5), Err(Error::InvalidConfig(_))), "alpha {alpha}");
    }
    assert!(matches!(fuse(&dense, &sparse, 0.5, 0), Err(Error::InvalidConfig(_))));
}

#[test]
fn engine_fuses_whatever_the_retrievers_return() {
    let (dense, sparse) = fixed_lists();
    let engine = HybridSearchEngine::new(
        StaticRetriever { source: SourceKind::Sparse, ranking: sparse },
        StaticRetriever { source: SourceKind::Dense, ranking: dense },
    );
    let fused = engine.query("ignored", 10, DEFAULT_ALPHA).expect("query");
    assert_eq!(fused_ids(&fused), vec!["a", "c", "b", "d"]);
    assert_eq!(engine.sparse().source(), SourceKind::Sparse);
    assert_eq!(engine.dense().source(), SourceKind::Dense);
}

#[test]
fn empty_corpus_answers_with_no_results() {
    let engine = engine_over(&[]);
    assert!(engine.is_empty());
    assert!(engine.query("anything at all", 5, DEFAULT_ALPHA).expect("query").is_empty());
}

#[test]
fn parameters_are_checked_even_on_an_empty_engine() {
    let engine = engine_over(&[]);
    assert!(matches!(engine.query("q", 0, 0.5), Err(Error::InvalidConfig(_))));
    assert!(matches!(engine.query("q", 5, 1.01), Err(Error::InvalidConfig(_))));
}

#[test]
fn invalid_retrieval_config_is_rejected_at_build() {
    let config = RetrievalConfig { alpha: 2.0, ..RetrievalConfig::default() };
    let err = HybridSearchEngine::build(&[], Arc::new(HashEmbedder::new(8)), &config).err().expect("fails");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn quick_fox_returns_both_chunks_with_lexical_match_first_when_sparse_only() {
    let chunks = vec![
        ChunkRecord::new("doc1", "doc1_c0", "the quick brown fox"),
        ChunkRecord::new("doc1", "doc1_c1", "jumps over the lazy dog"),
    ];
    let engine = engine_over(&chunks);

    let fused = engine.query("quick fox", 5, DEFAULT_ALPHA).expect("query");
    let found: HashSet<&str> = fused.iter().map(|h| h.chunk_id.as_str()).collect();
    assert_eq!(found, HashSet::from(["doc1_c0", "doc1_c1"]));

    let lexical = engine.query("quick fox", 5, 0.0).expect("query");
    assert_eq!(lexical[0].chunk_id, "doc1_c0");
    assert_eq!(lexical[0].score, 1.0);
}

#[test]
fn results_are_bounded_unique_and_in_unit_range() {
    let chunks: Vec<ChunkRecord> = (0..30)
        .map(|i| ChunkRecord::new(format!("doc{}", i / 5), format!("c{i}"), format!("pump {} seal {} flow", i % 4, i)))
        .collect();
    let engine = engine_over(&chunks);
    for top_k in [1, 3, 8] {
        let fused = engine.query("pump seal 2", top_k, DEFAULT_ALPHA).expect("query");
        assert!(fused.len() <= top_k);
        let unique: HashSet<&str> = fused.iter().map(|h| h.chunk_id.as_str()).collect();
        assert_eq!(unique.len(), fused.len());
        assert!(fused.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(fused.iter().all(|h| (0.0..=1.0 + 1e-6).contains(&h.score)));
    }
}

#[test]
fn chunks_dropped_by_one_index_still_reach_the_fused_list() {
    let chunks = vec![ChunkRecord::new("d", "punct", "?!"), ChunkRecord::new("d", "real", "valve")];
    let engine = engine_over(&chunks);
    assert_eq!(engine.sparse().len(), 1);
    assert_eq!(engine.dense().len(), 2);

    let fused = engine.query("valve", 5, DEFAULT_ALPHA).expect("query");
    let found: HashSet<&str> = fused.iter().map(|h| h.chunk_id.as_str()).collect();
    assert_eq!(found, HashSet::from(["punct", "real"]));
}

#[tokio::test]
async fn concurrent_query_matches_sequential_query() {
    let chunks: Vec<ChunkRecord> = (0..12)
        .map(|i| ChunkRecord::new("manual", format!("manual_c{i}"), format!("step {i} check the filter and the valve")))
        .collect();
    let engine = engine_over(&chunks);
    let sequential = engine.query("filter valve 7", 4, DEFAULT_ALPHA).expect("query");
    let concurrent = engine.query_concurrent("filter valve 7", 4, DEFAULT_ALPHA).await.expect("query");
    assert_eq!(sequential, concurrent);

    let empty = engine_over(&[]);
    assert!(empty.query_concurrent("x", 4, DEFAULT_ALPHA).await.expect("query").is_empty());
    assert!(matches!(engine.query_concurrent("x", 4, -1.0).await, Err(Error::InvalidConfig(_))));
}
